//! Provider registry and transform dispatch.
//!
//! Every provider is one row in [`PROVIDERS`]: an identifier, its fixed source
//! URL(s), and a [`Format`] tag that selects the extractor. Dispatch builds the
//! base record, runs the extractor, and merges the result over the base.
//!
//! # Supported formats
//!
//! | Format | Module | Raw input |
//! |--------|--------|-----------|
//! | [`Format::AwsPrefixes`] | [`json`] | Two named arrays of prefix objects |
//! | [`Format::TypedPrefixes`] | [`json`] | One array, objects keyed `ipv4Prefix`/`ipv6Prefix` |
//! | [`Format::OracleRegions`] | [`json`] | Regions holding `cidrs` arrays |
//! | [`Format::HubPrefixes`] | [`json`] | Two feeds merged in order |
//! | [`Format::SplitArrays`] | [`json`] | One pure-v4 and one pure-v6 array |
//! | [`Format::MetaArrays`] | [`json`] | Many top-level string arrays |
//! | [`Format::Subnets`] | [`json`] | `subnets` array of prefix objects |
//! | [`Format::SplitText`] | [`text`] | One plain-text response per family |
//! | [`Format::DelimitedText`] | [`text`] | CSV-like lines, first column |
//! | [`Format::AsnLookup`] | [`text`] | AS-tagged lines filtered by ASN |
//! | [`Format::ServiceTags`] | [`html`] + [`json`] | Download page, then JSON |
//! | [`Format::ZipArchive`] | [`archive`] | ZIP with one member per family |

pub mod archive;
pub mod html;
pub mod json;
pub mod text;

use crate::error::{TransformError, UnknownProvider};
use crate::models::{Extraction, NormalizedRecord, RawResponse, RecordStatus};
use crate::utils::{provider_label, timestamp_now};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Signature shared by every format extractor.
pub type Extractor = fn(&[RawResponse], Option<&str>) -> Result<Extraction, TransformError>;

/// How a provider encodes its ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    AwsPrefixes,
    TypedPrefixes,
    OracleRegions,
    HubPrefixes,
    SplitArrays,
    MetaArrays,
    Subnets,
    SplitText,
    DelimitedText,
    AsnLookup,
    ServiceTags,
    ZipArchive,
}

impl Format {
    pub fn extractor(&self) -> Extractor {
        match self {
            Format::AwsPrefixes => json::aws_prefixes,
            Format::TypedPrefixes => json::typed_prefixes,
            Format::OracleRegions => json::oracle_regions,
            Format::HubPrefixes => json::hub_prefixes,
            Format::SplitArrays => json::split_arrays,
            Format::MetaArrays => json::meta_arrays,
            Format::Subnets => json::subnets,
            Format::SplitText => text::split_text,
            Format::DelimitedText => text::delimited_text,
            Format::AsnLookup => text::asn_lookup,
            Format::ServiceTags => json::service_tags,
            Format::ZipArchive => archive::zip_archive,
        }
    }

    /// Whether the first response only points at the real data.
    pub fn needs_follow_up(&self) -> bool {
        matches!(self, Format::ServiceTags)
    }
}

/// Static description of one provider.
#[derive(Debug)]
pub struct ProviderSpec {
    /// Lowercase registry key.
    pub id: &'static str,
    /// Source URLs, fetched in this order.
    pub sources: &'static [&'static str],
    pub format: Format,
    /// Variant key used when the caller supplies none. ASN lookups leave it
    /// unset: the source URL already selects the ASN, so every line is kept.
    pub variant: Option<&'static str>,
}

impl ProviderSpec {
    pub fn label(&self) -> String {
        provider_label(self.id)
    }

    /// All source URLs joined for display.
    pub fn source(&self) -> String {
        self.sources.join(", ")
    }

    /// Run this provider's extractor over already fetched responses.
    ///
    /// Never fails: extractor errors are logged and leave the record with empty
    /// lists and [`RecordStatus::Error`].
    pub fn transform(&self, responses: &[RawResponse], variant: Option<&str>) -> NormalizedRecord {
        let mut record = base_record(self);
        let variant = variant.or(self.variant);
        debug!(
            provider = self.id,
            statuses = ?responses.iter().map(|r| r.status).collect::<Vec<_>>(),
            ?variant,
            "Transforming responses"
        );

        match (self.format.extractor())(responses, variant) {
            Ok(extraction) => {
                for problem in &extraction.problems {
                    warn!(provider = self.id, error = %problem, "Partial failure; keeping remaining ranges");
                }
                record.status = if extraction.problems.is_empty() {
                    RecordStatus::Success
                } else if extraction.ipv4.is_empty() && extraction.ipv6.is_empty() {
                    RecordStatus::Error
                } else {
                    RecordStatus::Degraded
                };
                record.ipv4 = extraction.ipv4;
                record.ipv6 = extraction.ipv6;
                if let Some(last_updated) = extraction.last_updated {
                    record.last_updated = last_updated;
                }
            }
            Err(e) => {
                warn!(provider = self.id, error = %e, "Transform failed; reporting empty ranges");
                record.status = RecordStatus::Error;
            }
        }

        info!(
            provider = self.id,
            ipv4 = record.ipv4.len(),
            ipv6 = record.ipv6.len(),
            status = record.status.as_str(),
            "Transformed provider"
        );
        record
    }
}

/// Every supported provider, in output order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        id: "aws",
        sources: &["https://ip-ranges.amazonaws.com/ip-ranges.json"],
        format: Format::AwsPrefixes,
        variant: None,
    },
    ProviderSpec {
        id: "cloudflare",
        sources: &[
            "https://www.cloudflare.com/ips-v4",
            "https://www.cloudflare.com/ips-v6",
        ],
        format: Format::SplitText,
        variant: None,
    },
    ProviderSpec {
        id: "digitalocean",
        sources: &["https://www.digitalocean.com/geo/google.csv"],
        format: Format::DelimitedText,
        variant: None,
    },
    ProviderSpec {
        id: "google_cloud",
        sources: &["https://www.gstatic.com/ipranges/cloud.json"],
        format: Format::TypedPrefixes,
        variant: None,
    },
    ProviderSpec {
        id: "googlebot",
        sources: &["https://developers.google.com/static/search/apis/ipranges/googlebot.json"],
        format: Format::TypedPrefixes,
        variant: None,
    },
    ProviderSpec {
        id: "bingbot",
        sources: &["https://www.bing.com/toolbox/bingbot.json"],
        format: Format::TypedPrefixes,
        variant: None,
    },
    ProviderSpec {
        id: "openai",
        sources: &["https://openai.com/gptbot.json"],
        format: Format::TypedPrefixes,
        variant: None,
    },
    ProviderSpec {
        id: "oracle_cloud",
        sources: &["https://docs.oracle.com/en-us/iaas/tools/public_ip_ranges.json"],
        format: Format::OracleRegions,
        variant: None,
    },
    ProviderSpec {
        id: "microsoft_azure",
        sources: &["https://www.microsoft.com/en-us/download/details.aspx?id=56519"],
        format: Format::ServiceTags,
        variant: None,
    },
    ProviderSpec {
        id: "linode",
        sources: &["https://geoip.linode.com/"],
        format: Format::DelimitedText,
        variant: None,
    },
    ProviderSpec {
        id: "apple_icloud",
        sources: &["https://mask-api.icloud.com/egress-ip-ranges.csv"],
        format: Format::DelimitedText,
        variant: None,
    },
    ProviderSpec {
        id: "github",
        sources: &["https://api.github.com/meta"],
        format: Format::MetaArrays,
        variant: None,
    },
    ProviderSpec {
        id: "fastly",
        sources: &["https://api.fastly.com/public-ip-list"],
        format: Format::SplitArrays,
        variant: None,
    },
    ProviderSpec {
        id: "akamai",
        sources: &["https://techdocs.akamai.com/property-manager/pdfs/akamai_ipv4_ipv6_CIDRs-txt.zip"],
        format: Format::ZipArchive,
        variant: None,
    },
    ProviderSpec {
        id: "zscaler",
        sources: &[
            "https://config.zscaler.com/api/zscaler.net/hubs/cidr/json/required",
            "https://config.zscaler.com/api/zscaler.net/hubs/cidr/json/recommended",
        ],
        format: Format::HubPrefixes,
        variant: None,
    },
    ProviderSpec {
        id: "vultr",
        sources: &["https://geofeed.constant.com/?json"],
        format: Format::Subnets,
        variant: None,
    },
    ProviderSpec {
        id: "a2hosting",
        sources: &["https://api.hackertarget.com/aslookup/?q=AS55293"],
        format: Format::AsnLookup,
        variant: None,
    },
    ProviderSpec {
        id: "softlayer_ibm",
        sources: &["https://api.hackertarget.com/aslookup/?q=AS36351"],
        format: Format::AsnLookup,
        variant: None,
    },
    ProviderSpec {
        id: "hetzner",
        sources: &["https://api.hackertarget.com/aslookup/?q=AS24940"],
        format: Format::AsnLookup,
        variant: None,
    },
    ProviderSpec {
        id: "ovh",
        sources: &["https://api.hackertarget.com/aslookup/?q=AS16276"],
        format: Format::AsnLookup,
        variant: None,
    },
];

static INDEX: Lazy<HashMap<&'static str, &'static ProviderSpec>> =
    Lazy::new(|| PROVIDERS.iter().map(|spec| (spec.id, spec)).collect());

/// Look up a provider by identifier.
pub fn lookup(id: &str) -> Result<&'static ProviderSpec, UnknownProvider> {
    INDEX
        .get(id)
        .copied()
        .ok_or_else(|| UnknownProvider(id.to_string()))
}

/// Resolve requested identifiers, or every provider when none are given.
///
/// Fails on the first unknown identifier so a bad selection stops the run
/// before anything is fetched. Duplicates are dropped; registry order is kept.
pub fn resolve(ids: &[String]) -> Result<Vec<&'static ProviderSpec>, UnknownProvider> {
    if ids.is_empty() {
        return Ok(PROVIDERS.iter().collect());
    }
    for id in ids {
        lookup(id)?;
    }
    let selected = PROVIDERS
        .iter()
        .filter(|spec| ids.iter().any(|id| id == spec.id))
        .collect::<Vec<_>>();
    debug!(count = selected.len(), "Resolved providers");
    Ok(selected)
}

/// The response at `index`, or [`TransformError::MissingResponse`].
pub(crate) fn response_at(
    responses: &[RawResponse],
    index: usize,
) -> Result<&RawResponse, TransformError> {
    responses
        .get(index)
        .ok_or(TransformError::MissingResponse(index))
}

/// Build the skeleton record every transform starts from.
pub fn base_record(spec: &ProviderSpec) -> NormalizedRecord {
    NormalizedRecord {
        provider: spec.label(),
        source: spec.source(),
        last_updated: timestamp_now(),
        ipv4: Vec::new(),
        ipv6: Vec::new(),
        status: RecordStatus::Success,
    }
}

/// [`base_record`] by identifier.
pub fn transform_base(id: &str) -> Result<NormalizedRecord, UnknownProvider> {
    lookup(id).map(base_record)
}

/// Transform already fetched responses for provider `id`.
pub fn transform(
    id: &str,
    responses: &[RawResponse],
    variant: Option<&str>,
) -> Result<NormalizedRecord, UnknownProvider> {
    Ok(lookup(id)?.transform(responses, variant))
}
