use crate::adapters::JsonRecords;
use crate::core::converter::{DeliverConverter, LockerConverter, ParcelConverter, UserConverter};
use crate::core::report::{ParcelReportService, ReportSet};
use crate::core::repository::{
    DataRepository, DeliverRepository, LockerRepository, ParcelRepository, UserRepository,
};
use crate::core::summary::ParcelSummaryRepository;
use crate::core::validator::{
    DeliverValidator, EmailRules, LockerValidator, ParcelValidator, UserValidator,
};
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::Result;

/// The four repositories wired over JSON files, joined for reporting.
pub type JsonCatalog<S> = ParcelSummaryRepository<
    UserRepository<JsonRecords<S>>,
    LockerRepository<JsonRecords<S>>,
    ParcelRepository<JsonRecords<S>>,
    DeliverRepository<JsonRecords<S>>,
>;

pub struct EtlEngine<S: Storage + Clone, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage + Clone, C: ConfigProvider> EtlEngine<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn email_rules(&self) -> EmailRules {
        EmailRules {
            check_deliverability: self.config.check_deliverability(),
        }
    }

    /// Loads and validates all four data files.
    pub fn load(&self) -> Result<JsonCatalog<S>> {
        let records = || JsonRecords::new(self.storage.clone());
        let email = self.email_rules();

        tracing::info!("Loading users from {}", self.config.users_file());
        let users = DataRepository::new(
            records(),
            UserValidator::new(email),
            UserConverter,
            Some(self.config.users_file().to_string()),
        )?;

        tracing::info!("Loading lockers from {}", self.config.lockers_file());
        let lockers = DataRepository::new(
            records(),
            LockerValidator::new(self.config.allow_zero_capacity()),
            LockerConverter,
            Some(self.config.lockers_file().to_string()),
        )?;

        tracing::info!("Loading parcels from {}", self.config.parcels_file());
        let parcels = DataRepository::new(
            records(),
            ParcelValidator::default(),
            ParcelConverter,
            Some(self.config.parcels_file().to_string()),
        )?;

        tracing::info!("Loading deliveries from {}", self.config.delivers_file());
        let delivers = DataRepository::new(
            records(),
            DeliverValidator::new(email),
            DeliverConverter,
            Some(self.config.delivers_file().to_string()),
        )?;

        Ok(ParcelSummaryRepository::new(users, lockers, parcels, delivers))
    }

    pub fn run(&self) -> Result<ReportSet> {
        let catalog = self.load()?;
        tracing::info!(
            "Computing reports over {} deliveries",
            catalog.delivery_repo.get_data().len()
        );
        Ok(ParcelReportService::new(&catalog).all())
    }
}
