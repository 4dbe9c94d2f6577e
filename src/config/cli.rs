use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_json_file, validate_path, Validate};
use crate::utils::logger::LogFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "locker-etl")]
#[command(about = "Validates parcel locker data and reports on deliveries")]
pub struct CliConfig {
    /// TOML configuration file. When given it replaces the data and
    /// validation flags below.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "./data")]
    pub data_dir: String,

    #[arg(long, default_value = "users.json")]
    pub users_file: String,

    #[arg(long, default_value = "lockers.json")]
    pub lockers_file: String,

    #[arg(long, default_value = "parcels.json")]
    pub parcels_file: String,

    #[arg(long, default_value = "delivers.json")]
    pub delivers_file: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Accept lockers declaring zero compartments of a size")]
    pub allow_zero_capacity: bool,

    #[arg(long, help = "Accept email domains without checking that they resolve")]
    pub skip_deliverability: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print all four reports as JSON
    Report,
    /// Write the CSV tables and JSON reports as a zip under the output path
    Export {
        /// Archive name, defaults to reports.zip
        #[arg(long)]
        bundle: Option<String>,
    },
    /// Register a new delivery
    Send {
        #[arg(long)]
        parcel_id: String,
        #[arg(long)]
        locker_id: String,
        #[arg(long)]
        sender_email: String,
        #[arg(long)]
        receiver_email: String,
        #[arg(long)]
        sent_date: String,
        #[arg(long)]
        expected_delivery_date: String,
    },
    /// Show where a parcel is
    Find {
        parcel_id: String,
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        today: Option<String>,
    },
}

impl ConfigProvider for CliConfig {
    fn users_file(&self) -> &str {
        &self.users_file
    }

    fn lockers_file(&self) -> &str {
        &self.lockers_file
    }

    fn parcels_file(&self) -> &str {
        &self.parcels_file
    }

    fn delivers_file(&self) -> &str {
        &self.delivers_file
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn allow_zero_capacity(&self) -> bool {
        self.allow_zero_capacity
    }

    fn check_deliverability(&self) -> bool {
        !self.skip_deliverability
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("data_dir", &self.data_dir)?;
        validate_json_file("users_file", &self.users_file)?;
        validate_json_file("lockers_file", &self.lockers_file)?;
        validate_json_file("parcels_file", &self.parcels_file)?;
        validate_json_file("delivers_file", &self.delivers_file)?;
        validate_path("output_path", &self.output_path)?;
        if let Command::Export {
            bundle: Some(bundle),
        } = &self.command
        {
            validate_path("bundle", bundle)?;
        }
        Ok(())
    }
}
