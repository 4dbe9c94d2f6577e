use crate::core::report::ReportSet;
use crate::domain::model::CompartmentSize;
use crate::domain::ports::Storage;
use crate::utils::error::{LockerError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// The four reports as CSV tables, ready for a spreadsheet or a dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTables {
    pub sizes_per_locker: String,
    pub city_hotspots: String,
    pub transit_days: String,
    pub locker_capacity: String,
}

impl ReportTables {
    pub fn render(reports: &ReportSet) -> Result<Self> {
        Ok(Self {
            sizes_per_locker: sizes_per_locker(reports)?,
            city_hotspots: city_hotspots(reports)?,
            transit_days: transit_days(reports)?,
            locker_capacity: locker_capacity(reports)?,
        })
    }

    fn files(&self) -> [(&'static str, &str); 4] {
        [
            ("most_common_parcel_sizes.csv", self.sizes_per_locker.as_str()),
            ("city_most_shipments.csv", self.city_hotspots.as_str()),
            ("max_transit_days.csv", self.transit_days.as_str()),
            ("locker_capacity.csv", self.locker_capacity.as_str()),
        ]
    }
}

fn table<I, R>(header: &[&str], rows: I) -> Result<String>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| LockerError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| LockerError::ValidationError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

fn sizes_per_locker(reports: &ReportSet) -> Result<String> {
    let rows = reports
        .most_common_parcel_sizes_per_locker
        .iter()
        .map(|(locker_id, sizes)| {
            let names: Vec<&str> = sizes.iter().map(CompartmentSize::as_str).collect();
            vec![locker_id.clone(), names.join(", ")]
        });
    table(&["Locker ID", "Most Common Size(s)"], rows)
}

fn city_hotspots(reports: &ReportSet) -> Result<String> {
    let hotspots = &reports.city_most_shipments_by_size;
    let rows = [("sent", &hotspots.sent), ("received", &hotspots.received)]
        .into_iter()
        .map(|(direction, cities)| {
            let mut row = vec![direction.to_string()];
            row.extend(
                CompartmentSize::ALL
                    .iter()
                    .map(|size| cities.get(size).cloned().unwrap_or_default()),
            );
            row
        });
    table(&["sent/received", "small", "medium", "large"], rows)
}

fn transit_days(reports: &ReportSet) -> Result<String> {
    let rows = reports
        .max_days_between_sent_and_expected
        .iter()
        .map(|(email, days)| vec![email.clone(), days.to_string()]);
    table(&["email", "day"], rows)
}

fn locker_capacity(reports: &ReportSet) -> Result<String> {
    let rows = reports
        .is_parcel_limit_in_locker_exceeded
        .iter()
        .map(|(locker_id, compartments)| {
            let mut row = vec![locker_id.clone()];
            row.extend(
                CompartmentSize::ALL
                    .iter()
                    .map(|size| compartments.get(size).copied().unwrap_or(0).to_string()),
            );
            row
        });
    table(&["Locker ID", "Small", "Medium", "Large"], rows)
}

/// Zips the CSV tables together with the full reports as JSON.
pub fn bundle(reports: &ReportSet) -> Result<Vec<u8>> {
    let tables = ReportTables::render(reports)?;

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in tables.files() {
        zip.start_file::<_, ()>(name, FileOptions::default())?;
        zip.write_all(content.as_bytes())?;
    }

    zip.start_file::<_, ()>("reports.json", FileOptions::default())?;
    let json_data = serde_json::to_string_pretty(reports)?;
    zip.write_all(json_data.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Writes the report bundle through `storage` and returns where it went.
pub fn export_reports<S: Storage>(storage: &S, filename: &str, reports: &ReportSet) -> Result<String> {
    let zip_data = bundle(reports)?;
    tracing::debug!("Writing report bundle ({} bytes) to storage", zip_data.len());
    storage.write_file(filename, &zip_data)?;
    tracing::info!("Reports exported to {}", filename);
    Ok(filename.to_string())
}
