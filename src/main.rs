//! # Cloud IP Ranges
//!
//! Collects the IP ranges that cloud, CDN and hosting providers publish and
//! normalizes them into one record shape: provider, source, freshness, and
//! separate IPv4 and IPv6 lists.
//!
//! ## Usage
//!
//! ```sh
//! cloud_ip_ranges -o ./out -f json -f csv
//! ```
//!
//! ## Architecture
//!
//! 1. **Selection**: resolve the requested providers against the registry (unknown ids stop the run)
//! 2. **Fetching**: one task per provider, each URL tried once within the timeout
//! 3. **Transform**: the provider's format extractor fills the base record
//! 4. **Output**: write the record set as JSON and/or CSV

use clap::Parser;
use futures::stream::{self, StreamExt, TryStreamExt};
use itertools::Itertools;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod error;
mod fetch;
mod models;
mod outputs;
mod providers;
mod utils;

use cli::Cli;
use models::{NormalizedRecord, RecordStatus};
use outputs::OutputFormat;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    if args.list_providers {
        for spec in providers::PROVIDERS {
            let base = providers::transform_base(spec.id)?;
            println!("{:<16} {:<16} {}", spec.id, base.provider, base.source);
        }
        return Ok(());
    }

    // Unknown ids are a configuration error: stop before fetching anything.
    let selected = match providers::resolve(&args.providers) {
        Ok(selected) => selected,
        Err(e) => {
            error!(error = %e, "Invalid provider selection");
            return Err(e.into());
        }
    };

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(path = %args.output_dir, error = %e, "Output directory is not writable");
        return Err(e.into());
    }

    let client = fetch::build_client(Duration::from_secs(args.timeout_secs))?;
    let concurrency = args.concurrency.max(1);
    info!(
        providers = selected.len(),
        concurrency,
        timeout_secs = args.timeout_secs,
        "Collecting IP ranges"
    );

    let records: Vec<NormalizedRecord> = stream::iter(selected)
        .map(|spec| {
            let client = &client;
            async move {
                let responses = fetch::fetch_provider(client, spec).await;
                providers::transform(spec.id, &responses, None)
            }
        })
        .buffered(concurrency)
        .try_collect()
        .await?;

    let counts = records.iter().counts_by(|r| r.status);
    let count = |status| counts.get(&status).copied().unwrap_or(0);
    info!(
        total = records.len(),
        success = count(RecordStatus::Success),
        degraded = count(RecordStatus::Degraded),
        failed = count(RecordStatus::Error),
        ipv4 = records.iter().map(|r| r.ipv4.len()).sum::<usize>(),
        ipv6 = records.iter().map(|r| r.ipv6.len()).sum::<usize>(),
        "Collection complete"
    );

    for format in args.formats.iter().unique() {
        let written = match format {
            OutputFormat::Json => outputs::json::write_records(&records, &args.output_dir).await,
            OutputFormat::Csv => outputs::csv::write_records(&records, &args.output_dir).await,
        };
        if let Err(e) = written {
            error!(?format, error = %e, "Failed to write output");
            return Err(e);
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}
