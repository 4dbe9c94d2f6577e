use crate::domain::ports::{RecordReader, RecordWriter, Storage};
use crate::utils::error::{LockerError, Result};
use serde_json::Value;

/// JSON array files on top of any [`Storage`] backend.
#[derive(Debug, Clone, Default)]
pub struct JsonRecords<S> {
    storage: S,
}

impl<S: Storage> JsonRecords<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: Storage> RecordReader for JsonRecords<S> {
    fn read(&self, filename: &str) -> Result<Vec<Value>> {
        let bytes = self.storage.read_file(filename)?;
        match serde_json::from_slice(&bytes)? {
            Value::Array(items) => Ok(items),
            other => Err(LockerError::ValidationError {
                message: format!(
                    "{} must hold a JSON array, found {}",
                    filename,
                    json_kind(&other)
                ),
            }),
        }
    }
}

impl<S: Storage> RecordWriter for JsonRecords<S> {
    fn write(&self, filename: &str, records: &[Value]) -> Result<()> {
        let json_data = serde_json::to_vec_pretty(records)?;
        self.storage.write_file(filename, &json_data)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStorage;
    use serde_json::json;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonRecords<LocalStorage> {
        JsonRecords::new(LocalStorage::new(dir.path().to_str().unwrap()))
    }

    #[test]
    fn test_write_and_read_back_array() {
        let temp_dir = TempDir::new().unwrap();
        let records = store(&temp_dir);
        let data = vec![
            json!({"parcel_id": "P1", "height": 10, "length": 10, "weight": 1}),
            json!({"parcel_id": "P2", "height": 25, "length": 45, "weight": 2}),
        ];

        records.write("parcels.json", &data).unwrap();

        assert_eq!(records.read("parcels.json").unwrap(), data);
    }

    #[test]
    fn test_non_ascii_text_is_written_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let records = store(&temp_dir);
        records.write("users.json", &[json!({"city": "Kraków"})]).unwrap();

        let raw = std::fs::read_to_string(temp_dir.path().join("users.json")).unwrap();
        assert!(raw.contains("Kraków"));
    }

    #[test]
    fn test_read_rejects_non_array_document() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("lockers.json"), r#"{"locker_id": "L001"}"#).unwrap();

        let err = store(&temp_dir).read("lockers.json").unwrap_err();
        assert!(matches!(err, LockerError::ValidationError { message } if message.contains("an object")));
    }

    #[test]
    fn test_read_malformed_json_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("parcels.json"), "[{").unwrap();

        assert!(matches!(
            store(&temp_dir).read("parcels.json"),
            Err(LockerError::SerializationError(_))
        ));
    }
}
