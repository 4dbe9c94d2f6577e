use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;
use locker_etl::app::{export_reports, ParcelStatus};
use locker_etl::config::{CliConfig, Command, TomlConfig};
use locker_etl::core::validator::DeliverValidator;
use locker_etl::domain::model::DATE_FORMAT;
use locker_etl::domain::ports::ConfigProvider;
use locker_etl::utils::error::{ErrorSeverity, LockerError};
use locker_etl::utils::{logger, validation::Validate};
use locker_etl::{DeliveryDesk, EtlEngine, JsonRecords, LocalStorage};
use serde_json::json;

const DEFAULT_BUNDLE: &str = "reports.zip";

fn main() {
    let cli = CliConfig::parse();

    logger::init_logger(cli.log_format, cli.verbose);

    tracing::info!("Starting locker-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let outcome = match &cli.config {
        Some(path) => TomlConfig::from_file(path)
            .and_then(|config| config.validate().map(|_| config))
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
            .and_then(|config| {
                let data_dir = config.data_dir().to_string();
                let bundle = config.bundle_name().to_string();
                execute(&cli.command, &data_dir, &bundle, config)
            }),
        None => cli
            .validate()
            .context("Invalid command line configuration")
            .and_then(|_| execute(&cli.command, &cli.data_dir, DEFAULT_BUNDLE, cli.clone())),
    };

    if let Err(e) = outcome {
        let exit_code = match e.downcast_ref::<LockerError>() {
            Some(err) => {
                tracing::error!("{:#} (Severity: {:?})", e, err.severity());
                tracing::error!("Recovery suggestion: {}", err.recovery_suggestion());
                eprintln!("{}", err.user_friendly_message());
                eprintln!("Suggestion: {}", err.recovery_suggestion());
                match err.severity() {
                    ErrorSeverity::Low | ErrorSeverity::High => 1,
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::Critical => 3,
                }
            }
            None => {
                tracing::error!("{:#}", e);
                eprintln!("{:#}", e);
                1
            }
        };
        std::process::exit(exit_code);
    }
}

fn execute<C: ConfigProvider>(
    command: &Command,
    data_dir: &str,
    default_bundle: &str,
    config: C,
) -> anyhow::Result<()> {
    let engine = EtlEngine::new(LocalStorage::new(data_dir), config);

    match command {
        Command::Report => {
            let reports = engine.run()?;
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        Command::Export { bundle } => {
            let reports = engine.run()?;
            let output = LocalStorage::new(engine.config().output_path());
            let name = bundle.as_deref().unwrap_or(default_bundle);
            export_reports(&output, name, &reports)?;
            println!("Reports saved to {}/{}", engine.config().output_path(), name);
        }
        Command::Send {
            parcel_id,
            locker_id,
            sender_email,
            receiver_email,
            sent_date,
            expected_delivery_date,
        } => {
            let desk = delivery_desk(&engine);
            let deliver = desk.send_parcel(json!({
                "parcel_id": parcel_id,
                "locker_id": locker_id,
                "sender_email": sender_email,
                "receiver_email": receiver_email,
                "sent_date": sent_date,
                "expected_delivery_date": expected_delivery_date,
            }))?;
            println!(
                "Parcel {} registered for locker {}, expected on {}",
                deliver.parcel_id, deliver.locker_id, deliver.expected_delivery_date
            );
        }
        Command::Find { parcel_id, today } => {
            let today = match today {
                Some(day) => NaiveDate::parse_from_str(day, DATE_FORMAT)
                    .with_context(|| format!("Invalid reference date: {}", day))?,
                None => Local::now().date_naive(),
            };
            let tracked = delivery_desk(&engine).find_parcel(parcel_id, today)?;
            if tracked.is_empty() {
                println!("Parcel {} not found", parcel_id);
            }
            for parcel in tracked {
                let status = match parcel.status {
                    ParcelStatus::ReadyForPickup => "ready for pickup",
                    ParcelStatus::OutForDelivery => "out for delivery",
                };
                println!(
                    "Parcel {} in locker {}: {} (expected {})",
                    parcel.deliver.parcel_id,
                    parcel.deliver.locker_id,
                    status,
                    parcel.deliver.expected_delivery_date
                );
            }
        }
    }

    Ok(())
}

fn delivery_desk<C: ConfigProvider>(
    engine: &EtlEngine<LocalStorage, C>,
) -> DeliveryDesk<JsonRecords<LocalStorage>> {
    DeliveryDesk::new(
        JsonRecords::new(engine.storage().clone()),
        DeliverValidator::new(engine.email_rules()),
        engine.config().delivers_file(),
    )
}
