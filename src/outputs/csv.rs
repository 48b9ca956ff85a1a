//! CSV export: one row per provider, address lists joined with spaces.

use super::FILE_STEM;
use crate::models::NormalizedRecord;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

const HEADER: [&str; 6] = ["provider", "source", "last_updated", "status", "ipv4", "ipv6"];

/// Render `records` as CSV text.
pub fn records_to_csv(records: &[NormalizedRecord]) -> Result<String, Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for record in records {
        let ipv4 = record.ipv4.join(" ");
        let ipv6 = record.ipv6.join(" ");
        writer.write_record([
            record.provider.as_str(),
            record.source.as_str(),
            record.last_updated.as_str(),
            record.status.as_str(),
            ipv4.as_str(),
            ipv6.as_str(),
        ])?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Write `records` to `{output_dir}/cloud_ip_ranges.csv`.
#[instrument(level = "info", skip_all, fields(%output_dir, count = records.len()))]
pub async fn write_records(
    records: &[NormalizedRecord],
    output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let csv = records_to_csv(records)?;
    let path = Path::new(output_dir).join(format!("{FILE_STEM}.csv"));
    fs::write(&path, csv).await?;
    info!(path = %path.display(), "Wrote CSV");
    Ok(path)
}
