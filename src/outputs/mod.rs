//! Export of normalized records.
//!
//! # Submodules
//!
//! - [`json`]: the full record set as a JSON array
//! - [`csv`]: one row per provider with the address lists flattened
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── cloud_ip_ranges.json
//! └── cloud_ip_ranges.csv
//! ```

pub mod csv;
pub mod json;

use clap::ValueEnum;

/// Base name shared by every output file.
pub const FILE_STEM: &str = "cloud_ip_ranges";

/// Export format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}
