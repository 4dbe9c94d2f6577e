use crate::core::converter::DeliverConverter;
use crate::core::validator::DeliverValidator;
use crate::domain::model::{Deliver, Record};
use crate::domain::ports::{Converter, RecordReader, RecordWriter, Validator};
use crate::utils::error::{LockerError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    /// The expected delivery date has passed; the parcel waits in its locker.
    ReadyForPickup,
    OutForDelivery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedParcel {
    pub deliver: Deliver,
    pub status: ParcelStatus,
}

/// Front desk operations on the deliveries file: registering a shipment and
/// tracking a parcel.
pub struct DeliveryDesk<R> {
    records: R,
    validator: DeliverValidator,
    filename: String,
}

impl<R: RecordReader + RecordWriter> DeliveryDesk<R> {
    pub fn new(records: R, validator: DeliverValidator, filename: impl Into<String>) -> Self {
        Self {
            records,
            validator,
            filename: filename.into(),
        }
    }

    /// Validates a new delivery and appends it to the deliveries file.
    /// Nothing is written when the record is rejected.
    pub fn send_parcel(&self, new_delivery: Value) -> Result<Deliver> {
        let record = Record::try_from(new_delivery)?;
        self.validator.check(&record)?;
        let deliver = DeliverConverter.convert(&record)?;

        let mut existing = self.records.read(&self.filename)?;
        existing.push(Value::Object(record.data));
        self.records.write(&self.filename, &existing)?;

        tracing::info!(
            "Parcel {} shipped to locker {}",
            deliver.parcel_id,
            deliver.locker_id
        );
        Ok(deliver)
    }

    /// Every delivery of `parcel_id` with its status as of `today`.
    ///
    /// Refuses to answer when the deliveries file holds any invalid record.
    pub fn find_parcel(&self, parcel_id: &str, today: NaiveDate) -> Result<Vec<TrackedParcel>> {
        let mut records = Vec::new();
        for value in self.records.read(&self.filename)? {
            let checked = Record::try_from(value)
                .and_then(|record| self.validator.check(&record).map(|_| record));
            match checked {
                Ok(record) => records.push(record),
                Err(rejection) => {
                    return Err(LockerError::ValidationError {
                        message: format!("Invalid data structure in {}: {}", self.filename, rejection),
                    })
                }
            }
        }

        let mut found = Vec::new();
        for record in records
            .iter()
            .filter(|r| r.get("parcel_id").and_then(Value::as_str) == Some(parcel_id))
        {
            let deliver = DeliverConverter.convert(record)?;
            let status = if deliver.expected_delivery_date < today {
                ParcelStatus::ReadyForPickup
            } else {
                ParcelStatus::OutForDelivery
            };
            found.push(TrackedParcel { deliver, status });
        }

        if found.is_empty() {
            tracing::info!("Parcel {} not found", parcel_id);
        }
        Ok(found)
    }
}
