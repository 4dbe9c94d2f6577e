use crate::core::validator::parse_count;
use crate::domain::model::{
    CompartmentSize, Deliver, Locker, Parcel, Record, User, Verbatim, DATE_FORMAT,
};
use crate::domain::ports::Converter;
use crate::utils::error::{LockerError, Result};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;

fn field<'a>(record: &'a Record, entity: &str, key: &str) -> Result<&'a Value> {
    record.get(key).ok_or_else(|| LockerError::ConversionError {
        entity: entity.to_string(),
        message: format!("missing field '{}'", key),
    })
}

fn text(record: &Record, entity: &str, key: &str) -> Result<String> {
    field(record, entity, key)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LockerError::ConversionError {
            entity: entity.to_string(),
            message: format!("field '{}' is not a string", key),
        })
}

fn coordinate(record: &Record, entity: &str, key: &str) -> Result<Verbatim<f64>> {
    let raw = field(record, entity, key)?;
    raw.as_f64()
        .map(|value| Verbatim::new(value, raw.clone()))
        .ok_or_else(|| LockerError::ConversionError {
            entity: entity.to_string(),
            message: format!("field '{}' is not a number", key),
        })
}

fn count(value: &Value, entity: &str, key: &str) -> Result<Verbatim<u32>> {
    parse_count(value)
        .and_then(|n| u32::try_from(n).ok())
        .map(|n| Verbatim::new(n, value.clone()))
        .ok_or_else(|| LockerError::ConversionError {
            entity: entity.to_string(),
            message: format!("field '{}' is not a non-negative count: {}", key, value),
        })
}

fn date(record: &Record, entity: &str, key: &str) -> Result<NaiveDate> {
    let raw = text(record, entity, key)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| LockerError::ConversionError {
        entity: entity.to_string(),
        message: format!("field '{}' is not a date ({}): {}", key, e, raw),
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserConverter;

impl Converter for UserConverter {
    type Output = User;

    fn convert(&self, record: &Record) -> Result<User> {
        const ENTITY: &str = "user";
        Ok(User {
            email: text(record, ENTITY, "email")?,
            name: text(record, ENTITY, "name")?,
            surname: text(record, ENTITY, "surname")?,
            city: text(record, ENTITY, "city")?,
            latitude: coordinate(record, ENTITY, "latitude")?,
            longitude: coordinate(record, ENTITY, "longitude")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LockerConverter;

impl Converter for LockerConverter {
    type Output = Locker;

    /// Fails with [`LockerError::UnknownCompartment`] for a size name outside
    /// small/medium/large; validation does not look at the names.
    fn convert(&self, record: &Record) -> Result<Locker> {
        const ENTITY: &str = "locker";
        let raw = field(record, ENTITY, "compartments")?
            .as_object()
            .ok_or_else(|| LockerError::ConversionError {
                entity: ENTITY.to_string(),
                message: "field 'compartments' is not an object".to_string(),
            })?;

        let mut compartments = BTreeMap::new();
        for (name, capacity) in raw {
            let size: CompartmentSize = name.parse()?;
            compartments.insert(size, count(capacity, ENTITY, name)?);
        }

        Ok(Locker {
            locker_id: text(record, ENTITY, "locker_id")?,
            city: text(record, ENTITY, "city")?,
            latitude: coordinate(record, ENTITY, "latitude")?,
            longitude: coordinate(record, ENTITY, "longitude")?,
            compartments,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParcelConverter;

impl Converter for ParcelConverter {
    type Output = Parcel;

    fn convert(&self, record: &Record) -> Result<Parcel> {
        const ENTITY: &str = "parcel";
        Ok(Parcel {
            parcel_id: text(record, ENTITY, "parcel_id")?,
            height: count(field(record, ENTITY, "height")?, ENTITY, "height")?,
            length: count(field(record, ENTITY, "length")?, ENTITY, "length")?,
            weight: count(field(record, ENTITY, "weight")?, ENTITY, "weight")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeliverConverter;

impl Converter for DeliverConverter {
    type Output = Deliver;

    fn convert(&self, record: &Record) -> Result<Deliver> {
        const ENTITY: &str = "deliver";
        Ok(Deliver {
            parcel_id: text(record, ENTITY, "parcel_id")?,
            locker_id: text(record, ENTITY, "locker_id")?,
            sender_email: text(record, ENTITY, "sender_email")?,
            receiver_email: text(record, ENTITY, "receiver_email")?,
            sent_date: date(record, ENTITY, "sent_date")?,
            expected_delivery_date: date(record, ENTITY, "expected_delivery_date")?,
        })
    }
}
