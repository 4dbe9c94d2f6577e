pub mod desk;
pub mod export;

pub use desk::{DeliveryDesk, ParcelStatus, TrackedParcel};
pub use export::{bundle, export_reports, ReportTables};
