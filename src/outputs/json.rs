//! JSON export: the record set as one pretty-printed array.

use super::FILE_STEM;
use crate::models::NormalizedRecord;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Write `records` to `{output_dir}/cloud_ip_ranges.json`.
///
/// # Returns
///
/// The path written, or an error if serialization or the write fails.
#[instrument(level = "info", skip_all, fields(%output_dir, count = records.len()))]
pub async fn write_records(
    records: &[NormalizedRecord],
    output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;
    let path = Path::new(output_dir).join(format!("{FILE_STEM}.json"));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON");
    Ok(path)
}
