use crate::core::grouping::index_by;
use crate::domain::model::{Deliver, Locker, Parcel, User};
use crate::domain::ports::{DataSource, DeliveryCatalog};
use std::collections::BTreeMap;

/// locker_id -> parcel_id -> number of deliveries.
pub type ParcelSummary = BTreeMap<String, BTreeMap<String, usize>>;

impl<T> DataSource<T> for Vec<T> {
    fn get_data(&self) -> &[T] {
        self
    }
}

/// Joins the four collections by primary key.
pub struct ParcelSummaryRepository<U, L, P, D> {
    pub user_repo: U,
    pub locker_repo: L,
    pub parcel_repo: P,
    pub delivery_repo: D,
    parcel_summary: Option<ParcelSummary>,
}

impl<U, L, P, D> ParcelSummaryRepository<U, L, P, D>
where
    U: DataSource<User>,
    L: DataSource<Locker>,
    P: DataSource<Parcel>,
    D: DataSource<Deliver>,
{
    pub fn new(user_repo: U, locker_repo: L, parcel_repo: P, delivery_repo: D) -> Self {
        Self {
            user_repo,
            locker_repo,
            parcel_repo,
            delivery_repo,
            parcel_summary: None,
        }
    }

    /// Deliveries counted per locker and parcel. Built on first use and kept
    /// until `force_refresh` or [`Self::invalidate`].
    pub fn parcel(&mut self, force_refresh: bool) -> &ParcelSummary {
        if force_refresh || self.parcel_summary.is_none() {
            tracing::info!("Building or refreshing parcel summary from repository");
            let summary = self.build_parcel();
            self.parcel_summary = Some(summary);
        }
        self.parcel_summary.get_or_insert_with(ParcelSummary::new)
    }

    pub fn invalidate(&mut self) {
        self.parcel_summary = None;
    }

    fn build_parcel(&self) -> ParcelSummary {
        let users = index_by(self.user_repo.get_data(), |u| u.email.as_str());
        let lockers = index_by(self.locker_repo.get_data(), |l| l.locker_id.as_str());
        let parcels = index_by(self.parcel_repo.get_data(), |p| p.parcel_id.as_str());

        let mut parcel_summary = ParcelSummary::new();
        for deliver in self.delivery_repo.get_data() {
            let parcel = parcels.get(deliver.parcel_id.as_str());
            let locker = lockers.get(deliver.locker_id.as_str());
            let sender = users.get(deliver.sender_email.as_str());
            let receiver = users.get(deliver.receiver_email.as_str());

            match (parcel, locker, sender, receiver) {
                (Some(parcel), Some(locker), Some(_), Some(_)) => {
                    *parcel_summary
                        .entry(locker.locker_id.clone())
                        .or_default()
                        .entry(parcel.parcel_id.clone())
                        .or_default() += 1;
                }
                _ => tracing::warn!(
                    "Parcel {} not available: delivery to locker {} from {} to {} has an unresolved reference",
                    deliver.parcel_id,
                    deliver.locker_id,
                    deliver.sender_email,
                    deliver.receiver_email
                ),
            }
        }

        parcel_summary
    }
}

impl<U, L, P, D> DeliveryCatalog for ParcelSummaryRepository<U, L, P, D>
where
    U: DataSource<User>,
    L: DataSource<Locker>,
    P: DataSource<Parcel>,
    D: DataSource<Deliver>,
{
    fn users(&self) -> &[User] {
        self.user_repo.get_data()
    }

    fn lockers(&self) -> &[Locker] {
        self.locker_repo.get_data()
    }

    fn parcels(&self) -> &[Parcel] {
        self.parcel_repo.get_data()
    }

    fn delivers(&self) -> &[Deliver] {
        self.delivery_repo.get_data()
    }
}

impl<C: DeliveryCatalog + ?Sized> DeliveryCatalog for &C {
    fn users(&self) -> &[User] {
        (**self).users()
    }

    fn lockers(&self) -> &[Locker] {
        (**self).lockers()
    }

    fn parcels(&self) -> &[Parcel] {
        (**self).parcels()
    }

    fn delivers(&self) -> &[Deliver] {
        (**self).delivers()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::utils::test_support::capture_logs;

    #[test]
    fn test_build_parcel_summary() {
        let mut delivers = delivers();
        delivers.push(deliver("P12345", "L001", JANE, JOHN, "2023-12-07", "2023-12-09"));
        let mut repo = ParcelSummaryRepository::new(users(), lockers(), parcels(), delivers);

        let summary = repo.parcel(false);

        assert_eq!(summary["L001"]["P12345"], 2);
        assert_eq!(summary["L002"]["P67890"], 1);
        assert_eq!(summary.len(), 2);
    }

    #[test]
    fn test_unknown_locker_is_skipped_with_warning() {
        let mut delivers = delivers();
        delivers.push(deliver("P12345", "L0015687", JOHN, JANE, "2023-12-01", "2023-12-05"));
        let mut repo = ParcelSummaryRepository::new(users(), lockers(), parcels(), delivers);

        let (summary, logs) = capture_logs(|| repo.parcel(false).clone());

        assert!(!summary.contains_key("L0015687"));
        assert_eq!(summary["L001"]["P12345"], 1);
        assert!(logs.contains("not available"));
    }

    #[test]
    fn test_missing_user_or_parcel_contributes_nothing() {
        let delivers = vec![
            deliver("P12345", "L001", "ghost@gmail.com", JANE, "2023-12-01", "2023-12-05"),
            deliver("P00000", "L002", JOHN, JANE, "2023-12-01", "2023-12-05"),
        ];
        let mut repo = ParcelSummaryRepository::new(users(), lockers(), parcels(), delivers);
        assert!(repo.parcel(false).is_empty());
    }

    #[test]
    fn test_summary_is_cached_until_forced() {
        let mut repo = ParcelSummaryRepository::new(users(), lockers(), parcels(), delivers());
        assert_eq!(repo.parcel(false)["L001"]["P12345"], 1);

        repo.delivery_repo
            .push(deliver("P12345", "L001", JANE, JOHN, "2023-12-07", "2023-12-09"));
        assert_eq!(repo.parcel(false)["L001"]["P12345"], 1);
        assert_eq!(repo.parcel(true)["L001"]["P12345"], 2);

        repo.delivery_repo.clear();
        repo.invalidate();
        assert!(repo.parcel(false).is_empty());
    }

    #[test]
    fn test_catalog_accessors() {
        let repo = ParcelSummaryRepository::new(users(), lockers(), parcels(), delivers());
        assert_eq!(repo.users().len(), 2);
        assert_eq!(repo.lockers()[1].locker_id, "L002");
        assert_eq!(repo.parcels().len(), 2);
        assert_eq!(repo.delivers().len(), 2);
    }
}
