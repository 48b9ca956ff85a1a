//! Extractors for providers that publish structured JSON.

use super::{html, response_at};
use crate::error::TransformError;
use crate::models::{Extraction, Family, RawResponse};
use crate::utils::family_by_shape;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct AwsRanges {
    #[serde(rename = "createDate")]
    create_date: Option<String>,
    prefixes: Vec<AwsIpv4Prefix>,
    ipv6_prefixes: Vec<AwsIpv6Prefix>,
}

#[derive(Debug, Deserialize)]
struct AwsIpv4Prefix {
    ip_prefix: String,
}

#[derive(Debug, Deserialize)]
struct AwsIpv6Prefix {
    ipv6_prefix: String,
}

/// `prefixes[].ip_prefix` and `ipv6_prefixes[].ipv6_prefix`, plus `createDate`.
pub fn aws_prefixes(
    responses: &[RawResponse],
    _variant: Option<&str>,
) -> Result<Extraction, TransformError> {
    let ranges: AwsRanges = response_at(responses, 0)?.error_for_status()?.json()?;
    Ok(Extraction {
        ipv4: ranges.prefixes.into_iter().map(|p| p.ip_prefix).collect(),
        ipv6: ranges.ipv6_prefixes.into_iter().map(|p| p.ipv6_prefix).collect(),
        last_updated: ranges.create_date,
        problems: Vec::new(),
    })
}

#[derive(Debug, Deserialize)]
struct TypedFeed {
    #[serde(rename = "creationTime")]
    creation_time: Option<String>,
    prefixes: Vec<TypedPrefix>,
}

#[derive(Debug, Deserialize)]
struct TypedPrefix {
    #[serde(rename = "ipv4Prefix")]
    ipv4_prefix: Option<String>,
    #[serde(rename = "ipv6Prefix")]
    ipv6_prefix: Option<String>,
}

/// One `prefixes` array whose objects carry either `ipv4Prefix` or `ipv6Prefix`.
///
/// Google Cloud, Googlebot, Bingbot and GPTBot all publish this shape.
pub fn typed_prefixes(
    responses: &[RawResponse],
    _variant: Option<&str>,
) -> Result<Extraction, TransformError> {
    let feed: TypedFeed = response_at(responses, 0)?.error_for_status()?.json()?;
    let mut extraction = Extraction {
        last_updated: feed.creation_time,
        ..Default::default()
    };
    for prefix in feed.prefixes {
        if let Some(v4) = prefix.ipv4_prefix {
            extraction.push(Family::V4, v4);
        }
        if let Some(v6) = prefix.ipv6_prefix {
            extraction.push(Family::V6, v6);
        }
    }
    Ok(extraction)
}

#[derive(Debug, Deserialize)]
struct OracleFeed {
    last_updated_timestamp: Option<String>,
    regions: Vec<OracleRegion>,
}

#[derive(Debug, Deserialize)]
struct OracleRegion {
    cidrs: Vec<OracleCidr>,
}

#[derive(Debug, Deserialize)]
struct OracleCidr {
    cidr: String,
}

/// `regions[].cidrs[].cidr`, family inferred from each string.
pub fn oracle_regions(
    responses: &[RawResponse],
    _variant: Option<&str>,
) -> Result<Extraction, TransformError> {
    let feed: OracleFeed = response_at(responses, 0)?.error_for_status()?.json()?;
    let mut extraction = Extraction {
        last_updated: feed.last_updated_timestamp,
        ..Default::default()
    };
    for cidr in feed.regions.into_iter().flat_map(|r| r.cidrs) {
        extraction.push(family_by_shape(&cidr.cidr), cidr.cidr);
    }
    Ok(extraction)
}

#[derive(Debug, Deserialize)]
struct HubFeed {
    #[serde(rename = "hubPrefixes")]
    hub_prefixes: Vec<String>,
}

/// Required and recommended feeds.
const HUB_FEEDS: usize = 2;

/// `hubPrefixes` from the required feed followed by the recommended feed.
///
/// A feed that cannot be read is recorded as a problem; the other feed's
/// prefixes are still kept.
///
/// # Arguments
///
/// * `responses` - Required feed at index 0, recommended feed at index 1
/// * `_variant` - Ignored
///
/// # Returns
///
/// Always `Ok`; per-feed failures land in [`Extraction::problems`].
pub fn hub_prefixes(
    responses: &[RawResponse],
    _variant: Option<&str>,
) -> Result<Extraction, TransformError> {
    let mut extraction = Extraction::default();
    for index in 0..HUB_FEEDS {
        let feed = response_at(responses, index)
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json::<HubFeed>());
        match feed {
            Ok(feed) => {
                for prefix in feed.hub_prefixes {
                    extraction.push(family_by_shape(&prefix), prefix);
                }
            }
            Err(e) => extraction.problems.push(e),
        }
    }
    Ok(extraction)
}

#[derive(Debug, Deserialize)]
struct SplitFeed {
    addresses: Vec<String>,
    ipv6_addresses: Vec<String>,
}

/// `addresses` is all IPv4, `ipv6_addresses` all IPv6.
pub fn split_arrays(
    responses: &[RawResponse],
    _variant: Option<&str>,
) -> Result<Extraction, TransformError> {
    let feed: SplitFeed = response_at(responses, 0)?.error_for_status()?.json()?;
    Ok(Extraction {
        ipv4: feed.addresses,
        ipv6: feed.ipv6_addresses,
        ..Default::default()
    })
}

/// Top-level arrays of the GitHub meta document that hold address ranges.
const META_KEYS: &[&str] = &[
    "hooks",
    "web",
    "api",
    "git",
    "github_enterprise_importer",
    "packages",
    "pages",
    "importer",
    "actions",
    "actions_macos",
    "codespaces",
    "dependabot",
    "copilot",
];

/// Every string in the known meta arrays, in [`META_KEYS`] order.
///
/// # Arguments
///
/// * `responses` - The meta document as response 0
/// * `_variant` - Ignored
///
/// # Returns
///
/// The ranges classified by shape, or [`TransformError::Shape`] when the
/// document is not an object or holds none of the known arrays.
pub fn meta_arrays(
    responses: &[RawResponse],
    _variant: Option<&str>,
) -> Result<Extraction, TransformError> {
    let response = response_at(responses, 0)?.error_for_status()?;
    let meta: Value = response.json()?;
    let shape = |reason| TransformError::Shape {
        url: response.url.clone(),
        reason,
    };
    let meta = meta.as_object().ok_or_else(|| shape("expected an object"))?;

    let arrays = META_KEYS
        .iter()
        .filter_map(|key| meta.get(*key).and_then(Value::as_array))
        .collect::<Vec<_>>();
    if arrays.is_empty() {
        return Err(shape("no known range arrays"));
    }

    let mut extraction = Extraction::default();
    for value in arrays.into_iter().flatten().filter_map(Value::as_str) {
        extraction.push(family_by_shape(value), value);
    }
    Ok(extraction)
}

#[derive(Debug, Deserialize)]
struct SubnetFeed {
    subnets: Vec<Subnet>,
}

#[derive(Debug, Deserialize)]
struct Subnet {
    ip_prefix: String,
}

/// `subnets[].ip_prefix`, family inferred from each string.
pub fn subnets(
    responses: &[RawResponse],
    _variant: Option<&str>,
) -> Result<Extraction, TransformError> {
    let feed: SubnetFeed = response_at(responses, 0)?.error_for_status()?.json()?;
    let mut extraction = Extraction::default();
    for subnet in feed.subnets {
        extraction.push(family_by_shape(&subnet.ip_prefix), subnet.ip_prefix);
    }
    Ok(extraction)
}

#[derive(Debug, Deserialize)]
struct ServiceTagsFeed {
    values: Vec<ServiceTag>,
}

#[derive(Debug, Deserialize)]
struct ServiceTag {
    name: Option<String>,
    properties: ServiceTagProperties,
}

#[derive(Debug, Deserialize)]
struct ServiceTagProperties {
    #[serde(rename = "addressPrefixes", default)]
    address_prefixes: Vec<String>,
    platform: Option<String>,
    #[serde(rename = "systemService")]
    system_service: Option<String>,
}

impl ServiceTag {
    fn matches(&self, variant: &str) -> bool {
        [
            self.name.as_deref(),
            self.properties.system_service.as_deref(),
            self.properties.platform.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|tag| tag.eq_ignore_ascii_case(variant))
    }
}

/// Service tag document behind the download page.
///
/// Response 0 is the download page, response 1 the JSON it links to. With a
/// variant key only values whose name, system service or platform equals it
/// are kept.
///
/// # Arguments
///
/// * `responses` - The download page, then the linked JSON document
/// * `variant` - Optional service tag, system service or platform name
///
/// # Returns
///
/// [`TransformError::MissingLink`] when the page has no download link, and
/// [`TransformError::MissingResponse`] when a link exists but the document
/// was never fetched.
pub fn service_tags(
    responses: &[RawResponse],
    variant: Option<&str>,
) -> Result<Extraction, TransformError> {
    let page = response_at(responses, 0)?.error_for_status()?;
    let Some(data) = responses.get(1) else {
        return Err(match html::download_link(&page.text()) {
            None => TransformError::MissingLink {
                url: page.url.clone(),
            },
            Some(_) => TransformError::MissingResponse(1),
        });
    };
    let feed: ServiceTagsFeed = data.error_for_status()?.json()?;

    let mut extraction = Extraction::default();
    for tag in feed.values {
        if let Some(variant) = variant {
            if !tag.matches(variant) {
                continue;
            }
        }
        for prefix in tag.properties.address_prefixes {
            extraction.push(family_by_shape(&prefix), prefix);
        }
    }
    debug!(
        ipv4 = extraction.ipv4.len(),
        ipv6 = extraction.ipv6.len(),
        ?variant,
        "Collected service tag prefixes"
    );
    Ok(extraction)
}
