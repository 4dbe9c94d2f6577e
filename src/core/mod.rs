pub mod converter;
pub mod etl;
pub mod grouping;
pub mod repository;
pub mod report;
pub mod summary;
pub mod validator;

pub use crate::domain::model::{
    CompartmentSize, Deliver, Locker, Parcel, Record, Rejection, Screened, User,
};
pub use crate::domain::ports::{
    ConfigProvider, Converter, DataSource, DeliveryCatalog, RecordReader, RecordWriter, Storage,
    Validator,
};
pub use crate::utils::error::Result;
