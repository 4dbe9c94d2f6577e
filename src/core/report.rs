use crate::core::grouping::{index_by, Tally};
use crate::domain::model::CompartmentSize;
use crate::domain::ports::DeliveryCatalog;
use serde::Serialize;
use std::collections::BTreeMap;

/// locker_id -> every size sharing the highest delivery count.
pub type SizeDemand = BTreeMap<String, Vec<CompartmentSize>>;

/// sender email -> longest transit in days.
pub type TransitExtremes = BTreeMap<String, i64>;

/// locker_id -> compartment -> capacity left, negative when overrun.
pub type CompartmentBalance = BTreeMap<String, BTreeMap<CompartmentSize, i64>>;

/// Busiest city per parcel size, for senders and receivers separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShipmentHotspots {
    pub sent: BTreeMap<CompartmentSize, String>,
    pub received: BTreeMap<CompartmentSize, String>,
}

/// All four reports computed in one pass over the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSet {
    pub most_common_parcel_sizes_per_locker: SizeDemand,
    pub city_most_shipments_by_size: ShipmentHotspots,
    pub max_days_between_sent_and_expected: TransitExtremes,
    pub is_parcel_limit_in_locker_exceeded: CompartmentBalance,
}

/// Operational reports over a [`DeliveryCatalog`].
///
/// Every report rebuilds its own lookups and walks the full delivery
/// collection; nothing is cached between calls.
pub struct ParcelReportService<C> {
    catalog: C,
}

impl<C: DeliveryCatalog> ParcelReportService<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn all(&self) -> ReportSet {
        ReportSet {
            most_common_parcel_sizes_per_locker: self.most_common_parcel_sizes_per_locker(),
            city_most_shipments_by_size: self.city_most_shipments_by_size(),
            max_days_between_sent_and_expected: self.max_days_between_sent_and_expected(),
            is_parcel_limit_in_locker_exceeded: self.is_parcel_limit_in_locker_exceeded(),
        }
    }

    pub fn most_common_parcel_sizes_per_locker(&self) -> SizeDemand {
        let parcels = index_by(self.catalog.parcels(), |p| p.parcel_id.as_str());

        let mut per_locker: BTreeMap<&str, Tally<CompartmentSize>> = BTreeMap::new();
        for deliver in self.catalog.delivers() {
            let Some(parcel) = parcels.get(deliver.parcel_id.as_str()) else {
                tracing::warn!("Parcel {} not available, delivery skipped", deliver.parcel_id);
                continue;
            };
            per_locker
                .entry(deliver.locker_id.as_str())
                .or_default()
                .add(parcel.size());
        }

        per_locker
            .into_iter()
            .filter(|(_, sizes)| !sizes.is_empty())
            .map(|(locker_id, sizes)| {
                let leaders = sizes.leaders().into_iter().copied().collect();
                (locker_id.to_string(), leaders)
            })
            .collect()
    }

    /// Ties go to the city seen first in delivery order.
    pub fn city_most_shipments_by_size(&self) -> ShipmentHotspots {
        let users = index_by(self.catalog.users(), |u| u.email.as_str());
        let parcels = index_by(self.catalog.parcels(), |p| p.parcel_id.as_str());

        let mut sent_counts: BTreeMap<CompartmentSize, Tally<&str>> = BTreeMap::new();
        let mut received_counts: BTreeMap<CompartmentSize, Tally<&str>> = BTreeMap::new();

        for deliver in self.catalog.delivers() {
            let parcel = parcels.get(deliver.parcel_id.as_str());
            let sender = users.get(deliver.sender_email.as_str());
            let receiver = users.get(deliver.receiver_email.as_str());

            if let (Some(parcel), Some(sender), Some(receiver)) = (parcel, sender, receiver) {
                let size = parcel.size();
                sent_counts.entry(size).or_default().add(sender.city.as_str());
                received_counts.entry(size).or_default().add(receiver.city.as_str());
            }
        }

        ShipmentHotspots {
            sent: busiest_cities(&sent_counts),
            received: busiest_cities(&received_counts),
        }
    }

    /// Only the sender(s) whose longest transit equals the overall longest are
    /// returned; everyone else is left out.
    pub fn max_days_between_sent_and_expected(&self) -> TransitExtremes {
        let mut per_sender: BTreeMap<&str, i64> = BTreeMap::new();
        for deliver in self.catalog.delivers() {
            let days = deliver.transit_days();
            per_sender
                .entry(deliver.sender_email.as_str())
                .and_modify(|max| *max = (*max).max(days))
                .or_insert(days);
        }

        let Some(longest) = per_sender.values().copied().max() else {
            return TransitExtremes::new();
        };

        per_sender
            .into_iter()
            .filter(|(_, days)| *days == longest)
            .map(|(email, days)| (email.to_string(), days))
            .collect()
    }

    /// Remaining capacity per locker compartment after placing every
    /// delivery. Overruns are logged and show up as negative values.
    pub fn is_parcel_limit_in_locker_exceeded(&self) -> CompartmentBalance {
        let parcels = index_by(self.catalog.parcels(), |p| p.parcel_id.as_str());

        let mut remaining: CompartmentBalance = self
            .catalog
            .lockers()
            .iter()
            .map(|locker| {
                let compartments = locker
                    .compartments
                    .iter()
                    .map(|(size, capacity)| (*size, i64::from(capacity.get())))
                    .collect();
                (locker.locker_id.clone(), compartments)
            })
            .collect();

        for deliver in self.catalog.delivers() {
            let Some(parcel) = parcels.get(deliver.parcel_id.as_str()) else {
                tracing::warn!("Parcel {} not available, delivery skipped", deliver.parcel_id);
                continue;
            };
            let Some(compartments) = remaining.get_mut(&deliver.locker_id) else {
                tracing::warn!("Locker {} not available, delivery skipped", deliver.locker_id);
                continue;
            };

            let size = parcel.size();
            let left = compartments.entry(size).or_insert(0);
            *left -= 1;
            if *left < 0 {
                tracing::warn!(
                    "Parcel limit exceeded in locker {} for {} compartments: {} over capacity",
                    deliver.locker_id,
                    size,
                    -*left
                );
            }
        }

        remaining
    }
}

fn busiest_cities(counts: &BTreeMap<CompartmentSize, Tally<&str>>) -> BTreeMap<CompartmentSize, String> {
    counts
        .iter()
        .filter_map(|(size, cities)| cities.leader().map(|city| (*size, city.to_string())))
        .collect()
}
