//! Command-line interface definitions for Cloud IP Ranges.
//!
//! Every option can also be supplied through the environment variable named
//! next to it.

use crate::outputs::OutputFormat;
use clap::Parser;

/// Command-line arguments for the Cloud IP Ranges collector.
///
/// # Examples
///
/// ```sh
/// # Every provider, JSON and CSV into the current directory
/// cloud_ip_ranges
///
/// # Only AWS and Cloudflare, JSON only
/// cloud_ip_ranges -p aws -p cloudflare -f json -o ./out
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory the output files are written to
    #[arg(short, long, env = "CLOUD_IP_RANGES_OUTPUT_DIR", default_value = ".")]
    pub output_dir: String,

    /// Output format (repeatable)
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_values_t = [OutputFormat::Json, OutputFormat::Csv]
    )]
    pub formats: Vec<OutputFormat>,

    /// Only collect these providers (repeatable); all providers when omitted
    #[arg(short = 'p', long = "provider", env = "CLOUD_IP_RANGES_PROVIDERS", value_delimiter = ',')]
    pub providers: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "CLOUD_IP_RANGES_TIMEOUT", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Number of providers fetched at the same time
    #[arg(long, env = "CLOUD_IP_RANGES_CONCURRENCY", default_value_t = 8)]
    pub concurrency: usize,

    /// Print the supported providers and exit
    #[arg(long)]
    pub list_providers: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["cloud_ip_ranges"]);
        assert_eq!(cli.output_dir, ".");
        assert_eq!(cli.formats, vec![OutputFormat::Json, OutputFormat::Csv]);
        assert!(cli.providers.is_empty());
        assert_eq!(cli.timeout_secs, 10);
        assert_eq!(cli.concurrency, 8);
        assert!(!cli.list_providers);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "cloud_ip_ranges",
            "-o",
            "/tmp/out",
            "-f",
            "csv",
            "-p",
            "aws",
            "-p",
            "cloudflare,zscaler",
        ]);

        assert_eq!(cli.output_dir, "/tmp/out");
        assert_eq!(cli.formats, vec![OutputFormat::Csv]);
        assert_eq!(cli.providers, vec!["aws", "cloudflare", "zscaler"]);
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["cloud_ip_ranges", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_cli_env_bindings() {
        use clap::CommandFactory;

        let command = Cli::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(|env| env.to_string_lossy().into_owned())
        };
        assert_eq!(env_of("output_dir").as_deref(), Some("CLOUD_IP_RANGES_OUTPUT_DIR"));
        assert_eq!(env_of("providers").as_deref(), Some("CLOUD_IP_RANGES_PROVIDERS"));
        assert_eq!(env_of("timeout_secs").as_deref(), Some("CLOUD_IP_RANGES_TIMEOUT"));
        assert_eq!(env_of("concurrency").as_deref(), Some("CLOUD_IP_RANGES_CONCURRENCY"));
    }
}
