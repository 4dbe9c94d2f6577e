// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod json_records;
pub mod storage;

pub use json_records::JsonRecords;
pub use storage::LocalStorage;
