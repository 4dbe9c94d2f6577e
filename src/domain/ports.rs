use crate::domain::model::{Deliver, Locker, Parcel, Record, Rejection, User};
use crate::utils::error::Result;
use serde_json::Value;

/// Byte-level backend the record readers and writers sit on.
pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

/// Reads the raw JSON array stored under `filename`. Elements are returned
/// untouched; turning them into [`Record`]s is the repository's job.
pub trait RecordReader {
    fn read(&self, filename: &str) -> Result<Vec<Value>>;
}

pub trait RecordWriter {
    fn write(&self, filename: &str, records: &[Value]) -> Result<()>;
}

/// Structural and semantic checks on one raw record.
pub trait Validator {
    fn check(&self, record: &Record) -> std::result::Result<(), Rejection>;

    fn validate(&self, record: &Record) -> bool {
        match self.check(record) {
            Ok(()) => true,
            Err(rejection) => {
                tracing::error!("{}", rejection);
                false
            }
        }
    }
}

/// Maps a validated raw record to its typed entity.
pub trait Converter {
    type Output;

    fn convert(&self, record: &Record) -> Result<Self::Output>;
}

pub trait DataSource<T> {
    fn get_data(&self) -> &[T];
}

/// The four collections the reports are computed from.
pub trait DeliveryCatalog {
    fn users(&self) -> &[User];
    fn lockers(&self) -> &[Locker];
    fn parcels(&self) -> &[Parcel];
    fn delivers(&self) -> &[Deliver];
}

pub trait ConfigProvider {
    fn users_file(&self) -> &str;
    fn lockers_file(&self) -> &str;
    fn parcels_file(&self) -> &str;
    fn delivers_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn allow_zero_capacity(&self) -> bool;
    fn check_deliverability(&self) -> bool;
}
