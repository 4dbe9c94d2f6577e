use crate::utils::error::{LockerError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One raw JSON object as read from a data file, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

impl TryFrom<Value> for Record {
    type Error = Rejection;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            _ => Err(Rejection::NotAnObject),
        }
    }
}

fn record_of<const N: usize>(fields: [(&str, Value); N]) -> Record {
    Record {
        data: fields
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    }
}

/// Why a raw record was refused by a validator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("validator declares no required keys")]
    NoRequiredKeys,

    #[error("missing required keys: {0:?}")]
    MissingKeys(Vec<String>),

    #[error("field '{field}' must be {expected}")]
    WrongType { field: String, expected: &'static str },

    #[error("{field} '{email}' is not a valid email: {reason}")]
    InvalidEmail {
        field: String,
        email: String,
        reason: String,
    },

    #[error("field '{field}' is not positive: {value}")]
    NotPositive { field: String, value: String },

    #[error("field '{field}' is out of range: {value}")]
    OutOfRange { field: String, value: String },

    #[error("field 'compartments' is not a dictionary")]
    CompartmentsNotObject,

    #[error("sender and receiver are the same address: {0}")]
    SameSenderAndReceiver(String),

    #[error("field '{field}' is not a YYYY-MM-DD date: {value}")]
    InvalidDate { field: String, value: String },

    #[error("sent date {sent} is not before expected delivery date {expected}")]
    DatesOutOfOrder { sent: NaiveDate, expected: NaiveDate },
}

/// Outcome of pushing one raw record through validation and conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Screened<T> {
    Accepted(T),
    Rejected(Rejection),
}

impl<T> Screened<T> {
    pub fn accepted(self) -> Option<T> {
        match self {
            Screened::Accepted(entity) => Some(entity),
            Screened::Rejected(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompartmentSize {
    Small,
    Medium,
    Large,
}

impl CompartmentSize {
    pub const ALL: [CompartmentSize; 3] = [Self::Small, Self::Medium, Self::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    /// Compartment a parcel of the given height and length needs.
    pub fn classify(height: u32, length: u32) -> Self {
        if height <= 20 && length <= 40 {
            Self::Small
        } else if height <= 30 && length <= 50 {
            Self::Medium
        } else {
            Self::Large
        }
    }
}

impl fmt::Display for CompartmentSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompartmentSize {
    type Err = LockerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            other => Err(LockerError::UnknownCompartment {
                name: other.to_string(),
            }),
        }
    }
}

/// A number parsed from a data file, kept together with the JSON it was
/// written as (`50` or `50.0`, `10` or `"10"`). Serializes as that JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verbatim<T> {
    value: T,
    raw: Value,
}

impl<T> Verbatim<T> {
    pub fn new(value: T, raw: Value) -> Self {
        Self { value, raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl<T: Copy> Verbatim<T> {
    pub fn get(&self) -> T {
        self.value
    }
}

impl From<u32> for Verbatim<u32> {
    fn from(value: u32) -> Self {
        Self::new(value, json!(value))
    }
}

impl From<f64> for Verbatim<f64> {
    fn from(value: f64) -> Self {
        Self::new(value, json!(value))
    }
}

impl<T> Serialize for Verbatim<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub surname: String,
    pub city: String,
    pub latitude: Verbatim<f64>,
    pub longitude: Verbatim<f64>,
}

impl User {
    pub fn to_record(&self) -> Record {
        record_of([
            ("email", json!(self.email)),
            ("name", json!(self.name)),
            ("surname", json!(self.surname)),
            ("city", json!(self.city)),
            ("latitude", self.latitude.raw().clone()),
            ("longitude", self.longitude.raw().clone()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Locker {
    pub locker_id: String,
    pub city: String,
    pub latitude: Verbatim<f64>,
    pub longitude: Verbatim<f64>,
    pub compartments: BTreeMap<CompartmentSize, Verbatim<u32>>,
}

impl Locker {
    pub fn to_record(&self) -> Record {
        let compartments: Map<String, Value> = self
            .compartments
            .iter()
            .map(|(size, capacity)| (size.as_str().to_string(), capacity.raw().clone()))
            .collect();

        record_of([
            ("locker_id", json!(self.locker_id)),
            ("city", json!(self.city)),
            ("latitude", self.latitude.raw().clone()),
            ("longitude", self.longitude.raw().clone()),
            ("compartments", Value::Object(compartments)),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parcel {
    pub parcel_id: String,
    pub height: Verbatim<u32>,
    pub length: Verbatim<u32>,
    pub weight: Verbatim<u32>,
}

impl Parcel {
    pub fn size(&self) -> CompartmentSize {
        CompartmentSize::classify(self.height.get(), self.length.get())
    }

    pub fn to_record(&self) -> Record {
        record_of([
            ("parcel_id", json!(self.parcel_id)),
            ("height", self.height.raw().clone()),
            ("length", self.length.raw().clone()),
            ("weight", self.weight.raw().clone()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deliver {
    pub parcel_id: String,
    pub locker_id: String,
    pub sender_email: String,
    pub receiver_email: String,
    pub sent_date: NaiveDate,
    pub expected_delivery_date: NaiveDate,
}

impl Deliver {
    /// Whole days between sending and the expected delivery.
    pub fn transit_days(&self) -> i64 {
        (self.expected_delivery_date - self.sent_date).num_days()
    }

    pub fn to_record(&self) -> Record {
        record_of([
            ("parcel_id", json!(self.parcel_id)),
            ("locker_id", json!(self.locker_id)),
            ("sender_email", json!(self.sender_email)),
            ("receiver_email", json!(self.receiver_email)),
            ("sent_date", json!(self.sent_date.format(DATE_FORMAT).to_string())),
            (
                "expected_delivery_date",
                json!(self.expected_delivery_date.format(DATE_FORMAT).to_string()),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(CompartmentSize::classify(20, 40), CompartmentSize::Small);
        assert_eq!(CompartmentSize::classify(21, 40), CompartmentSize::Medium);
        assert_eq!(CompartmentSize::classify(20, 41), CompartmentSize::Medium);
        assert_eq!(CompartmentSize::classify(30, 50), CompartmentSize::Medium);
        assert_eq!(CompartmentSize::classify(31, 50), CompartmentSize::Large);
        assert_eq!(CompartmentSize::classify(30, 51), CompartmentSize::Large);
        assert_eq!(CompartmentSize::classify(1, 200), CompartmentSize::Large);
    }

    #[test]
    fn test_compartment_size_from_str() {
        assert_eq!("medium".parse::<CompartmentSize>().unwrap(), CompartmentSize::Medium);
        assert!(matches!(
            "huge".parse::<CompartmentSize>(),
            Err(LockerError::UnknownCompartment { name }) if name == "huge"
        ));
        // names are lowercase on the wire
        assert!("SMALL".parse::<CompartmentSize>().is_err());
    }

    #[test]
    fn test_record_try_from_value() {
        assert!(Record::try_from(json!({"parcel_id": "P1"})).is_ok());
        assert_eq!(Record::try_from(json!([1, 2])), Err(Rejection::NotAnObject));
    }

    #[test]
    fn test_transit_days() {
        let deliver = Deliver {
            parcel_id: "P12345".to_string(),
            locker_id: "L001".to_string(),
            sender_email: "john.doe@gmail.com".to_string(),
            receiver_email: "jane.smith@gmail.com".to_string(),
            sent_date: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
            expected_delivery_date: NaiveDate::from_ymd_opt(2023, 12, 5).unwrap(),
        };
        assert_eq!(deliver.transit_days(), 4);
    }

    #[test]
    fn test_locker_to_record_uses_size_names() {
        let locker = Locker {
            locker_id: "L001".to_string(),
            city: "New York".to_string(),
            latitude: Verbatim::from(40.73061_f64),
            longitude: Verbatim::from(-73.935242_f64),
            compartments: BTreeMap::from([
                (CompartmentSize::Small, Verbatim::from(20_u32)),
                (CompartmentSize::Medium, Verbatim::from(15_u32)),
                (CompartmentSize::Large, Verbatim::new(5, json!("5"))),
            ]),
        };
        let record = locker.to_record();
        assert_eq!(
            record.get("compartments"),
            Some(&json!({"small": 20, "medium": 15, "large": "5"}))
        );
    }

    #[test]
    fn test_verbatim_serializes_as_written() {
        let height = Verbatim::new(10_u32, json!("10"));
        assert_eq!(height.get(), 10);
        assert_eq!(serde_json::to_value(&height).unwrap(), json!("10"));

        let latitude = Verbatim::new(50.0, json!(50));
        assert_eq!(serde_json::to_string(&latitude).unwrap(), "50");
        assert_ne!(latitude, Verbatim::from(50.0_f64));
    }
}
