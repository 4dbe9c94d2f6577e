pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{JsonRecords, LocalStorage};
pub use app::{DeliveryDesk, ParcelStatus, TrackedParcel};
pub use core::{etl::EtlEngine, report::ParcelReportService};
pub use utils::error::{LockerError, Result};
