use crate::core::converter::{DeliverConverter, LockerConverter, ParcelConverter, UserConverter};
use crate::core::validator::{DeliverValidator, LockerValidator, ParcelValidator, UserValidator};
use crate::domain::model::{Record, Screened};
use crate::domain::ports::{Converter, DataSource, RecordReader, Validator};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_required_field};
use serde_json::Value;

/// Loads one entity type from a JSON array file and caches the typed
/// collection.
///
/// Loading uses partial ingestion: a record that fails validation is logged
/// and dropped, the rest of the file is still kept.
pub struct DataRepository<R, V, C: Converter> {
    file_reader: R,
    validator: V,
    converter: C,
    filename: String,
    data: Vec<C::Output>,
}

pub type UserRepository<R> = DataRepository<R, UserValidator, UserConverter>;
pub type LockerRepository<R> = DataRepository<R, LockerValidator, LockerConverter>;
pub type ParcelRepository<R> = DataRepository<R, ParcelValidator, ParcelConverter>;
pub type DeliverRepository<R> = DataRepository<R, DeliverValidator, DeliverConverter>;

impl<R, V, C> DataRepository<R, V, C>
where
    R: RecordReader,
    V: Validator,
    C: Converter,
{
    /// Builds the repository and performs the initial load.
    ///
    /// A missing or blank filename is a configuration error.
    pub fn new(file_reader: R, validator: V, converter: C, filename: Option<String>) -> Result<Self> {
        let filename = validate_required_field("filename", &filename)?;
        validate_non_empty_string("filename", filename)?;

        let mut repository = Self {
            file_reader,
            validator,
            converter,
            filename: filename.clone(),
            data: Vec::new(),
        };
        repository.data = repository.process_data()?;
        Ok(repository)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Cached collection. An empty cache is logged but is not an error.
    pub fn get_data(&self) -> &[C::Output] {
        if self.data.is_empty() {
            tracing::warn!("No data available from {}", self.filename);
        }
        &self.data
    }

    /// Reloads from `filename`, or from the file configured last when `None`.
    pub fn refresh_data(&mut self, filename: Option<&str>) -> Result<&[C::Output]> {
        match filename {
            Some(name) => {
                validate_non_empty_string("filename", name)?;
                self.filename = name.to_string();
            }
            None => tracing::warn!("No filename provided, using {}", self.filename),
        }

        tracing::info!("Refreshing {}", self.filename);
        self.data = self.process_data()?;
        Ok(&self.data)
    }

    /// Drops the cached collection until the next refresh.
    pub fn invalidate(&mut self) {
        self.data.clear();
    }

    /// Validates and converts a single raw value.
    ///
    /// Conversion errors propagate: they mean the validator let through a
    /// record the converter cannot represent, such as an unknown compartment
    /// size.
    pub fn screen(&self, value: Value) -> Result<Screened<C::Output>> {
        let record = match Record::try_from(value) {
            Ok(record) => record,
            Err(rejection) => return Ok(Screened::Rejected(rejection)),
        };

        match self.validator.check(&record) {
            Ok(()) => Ok(Screened::Accepted(self.converter.convert(&record)?)),
            Err(rejection) => Ok(Screened::Rejected(rejection)),
        }
    }

    fn process_data(&self) -> Result<Vec<C::Output>> {
        tracing::info!("Reading data from {}", self.filename);
        let raw_data = self.file_reader.read(&self.filename)?;
        let total = raw_data.len();

        let mut valid_data = Vec::with_capacity(total);
        for entry in raw_data {
            let shown = entry.to_string();
            match self.screen(entry)? {
                Screened::Accepted(entity) => valid_data.push(entity),
                Screened::Rejected(rejection) => {
                    tracing::error!("Invalid entry ({}): {}", rejection, shown);
                }
            }
        }

        tracing::info!(
            "Loaded {} of {} records from {}",
            valid_data.len(),
            total,
            self.filename
        );
        Ok(valid_data)
    }
}

impl<R, V, C> DataSource<C::Output> for DataRepository<R, V, C>
where
    R: RecordReader,
    V: Validator,
    C: Converter,
{
    fn get_data(&self) -> &[C::Output] {
        DataRepository::get_data(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CompartmentSize, Rejection, User};
    use crate::utils::error::LockerError;
    use crate::utils::test_support::capture_logs;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryReader {
        files: RefCell<HashMap<String, Vec<Value>>>,
        reads: Cell<usize>,
        last_read: RefCell<Option<String>>,
    }

    impl MemoryReader {
        fn with_file(name: &str, records: Vec<Value>) -> Self {
            let reader = Self::default();
            reader.files.borrow_mut().insert(name.to_string(), records);
            reader
        }
    }

    impl RecordReader for &MemoryReader {
        fn read(&self, filename: &str) -> Result<Vec<Value>> {
            self.reads.set(self.reads.get() + 1);
            *self.last_read.borrow_mut() = Some(filename.to_string());
            self.files.borrow().get(filename).cloned().ok_or_else(|| {
                LockerError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", filename),
                ))
            })
        }
    }

    fn alice() -> Value {
        json!({
            "email": "alice.smith@gmail.com",
            "name": "Alice",
            "surname": "Smith",
            "city": "Chicago",
            "latitude": 41.878113,
            "longitude": -87.629799
        })
    }

    fn bob() -> Value {
        json!({
            "email": "bob.brown@gmail.com",
            "name": "Bob",
            "surname": "Brown",
            "city": "Boston",
            "latitude": 42.360081,
            "longitude": -71.058884
        })
    }

    fn user_repo<'a>(
        reader: &'a MemoryReader,
        filename: &str,
    ) -> Result<UserRepository<&'a MemoryReader>> {
        DataRepository::new(
            reader,
            UserValidator::default(),
            UserConverter,
            Some(filename.to_string()),
        )
    }

    #[test]
    fn test_missing_filename_is_config_error() {
        let reader = MemoryReader::default();
        let result = DataRepository::new(&reader, UserValidator::default(), UserConverter, None);
        assert!(matches!(
            result,
            Err(LockerError::MissingConfigError { field }) if field == "filename"
        ));
        assert_eq!(reader.reads.get(), 0);
    }

    #[test]
    fn test_blank_filename_is_config_error() {
        let reader = MemoryReader::default();
        assert!(matches!(
            user_repo(&reader, "  "),
            Err(LockerError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_construction_loads_and_refresh_rereads_same_file() {
        let reader = MemoryReader::with_file("user.json", vec![alice()]);
        let mut repo = user_repo(&reader, "user.json").unwrap();

        let data = repo.refresh_data(None).unwrap().to_vec();

        assert_eq!(reader.reads.get(), 2);
        assert_eq!(reader.last_read.borrow().as_deref(), Some("user.json"));
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].email, "alice.smith@gmail.com");
    }

    #[test]
    fn test_invalid_entries_are_dropped_and_logged() {
        let mut incomplete = alice();
        incomplete.as_object_mut().unwrap().remove("latitude");
        let reader = MemoryReader::with_file(
            "user.json",
            vec![alice(), incomplete, json!("not an object"), bob()],
        );

        let (repo, logs) = capture_logs(|| user_repo(&reader, "user.json").unwrap());

        let emails: Vec<&str> = repo.get_data().iter().map(|u: &User| u.email.as_str()).collect();
        assert_eq!(emails, vec!["alice.smith@gmail.com", "bob.brown@gmail.com"]);
        assert!(logs.contains("Invalid entry"));
        assert!(logs.contains("missing required keys"));
        assert!(logs.contains("Loaded 2 of 4 records"));
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut bad = bob();
        bad["email"] = json!("bob.brown.gmail.com");
        let reader = MemoryReader::with_file("user.json", vec![alice(), bad, bob()]);
        let mut repo = user_repo(&reader, "user.json").unwrap();

        let first = repo.get_data().to_vec();
        let second = repo.refresh_data(None).unwrap().to_vec();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_refresh_with_new_filename_switches_source() {
        let reader = MemoryReader::with_file("day1.json", vec![alice()]);
        reader
            .files
            .borrow_mut()
            .insert("day2.json".to_string(), vec![alice(), bob()]);
        let mut repo = user_repo(&reader, "day1.json").unwrap();

        assert_eq!(repo.refresh_data(Some("day2.json")).unwrap().len(), 2);
        assert_eq!(repo.filename(), "day2.json");
        assert_eq!(repo.refresh_data(None).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_cache_warns_but_returns_empty() {
        let reader = MemoryReader::with_file("user.json", vec![]);
        let repo = user_repo(&reader, "user.json").unwrap();

        let (len, logs) = capture_logs(|| repo.get_data().len());

        assert_eq!(len, 0);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("No data available"));
    }

    #[test]
    fn test_invalidate_clears_cache() {
        let reader = MemoryReader::with_file("user.json", vec![alice()]);
        let mut repo = user_repo(&reader, "user.json").unwrap();
        repo.invalidate();
        assert!(repo.get_data().is_empty());
        assert_eq!(repo.refresh_data(None).unwrap().len(), 1);
    }

    #[test]
    fn test_read_failure_propagates() {
        let reader = MemoryReader::default();
        assert!(matches!(
            user_repo(&reader, "missing.json"),
            Err(LockerError::IoError(_))
        ));
    }

    #[test]
    fn test_screen_reports_rejection_reason() {
        let reader = MemoryReader::with_file("user.json", vec![]);
        let repo = user_repo(&reader, "user.json").unwrap();

        let mut bad = alice();
        bad["email"] = json!("@missingusername.com");
        assert!(matches!(
            repo.screen(bad).unwrap(),
            Screened::Rejected(Rejection::InvalidEmail { .. })
        ));
        assert!(matches!(repo.screen(alice()).unwrap(), Screened::Accepted(_)));
    }

    #[test]
    fn test_unknown_compartment_aborts_locker_load() {
        let reader = MemoryReader::with_file(
            "lockers.json",
            vec![
                json!({"locker_id": "L001", "city": "New York", "latitude": 40.73, "longitude": -73.93,
                       "compartments": {"small": 20, "medium": 15, "large": 5}}),
                json!({"locker_id": "L002", "city": "Boston", "latitude": 42.36, "longitude": -71.05,
                       "compartments": {"small": 2, "jumbo": 1}}),
            ],
        );
        let result: Result<LockerRepository<&MemoryReader>> = DataRepository::new(
            &reader,
            LockerValidator::default(),
            LockerConverter,
            Some("lockers.json".to_string()),
        );
        assert!(matches!(
            result,
            Err(LockerError::UnknownCompartment { name }) if name == "jumbo"
        ));
    }

    #[test]
    fn test_locker_repository_keeps_valid_lockers() {
        let reader = MemoryReader::with_file(
            "lockers.json",
            vec![
                json!({"locker_id": "L001", "city": "New York", "latitude": 40.73, "longitude": -73.93,
                       "compartments": {"small": 20, "medium": 15, "large": 5}}),
                json!({"locker_id": "L002", "city": "Boston", "latitude": 42.36, "longitude": -71.05,
                       "compartments": {"small": 0}}),
            ],
        );
        let repo = DataRepository::new(
            &reader,
            LockerValidator::default(),
            LockerConverter,
            Some("lockers.json".to_string()),
        )
        .unwrap();

        assert_eq!(repo.get_data().len(), 1);
        assert_eq!(repo.get_data()[0].compartments[&CompartmentSize::Medium].get(), 15);
    }
}
