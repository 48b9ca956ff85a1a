//! Extractors for plain-text and CSV-like feeds.

use super::response_at;
use crate::error::TransformError;
use crate::models::{Extraction, Family, RawResponse};
use crate::utils::family_of_token;

/// Whole body as one range per non-empty line. Response 0 is IPv4, response 1 IPv6.
///
/// Each response is independent: a failed one is recorded as a problem and
/// the other family is still reported.
pub fn split_text(
    responses: &[RawResponse],
    _variant: Option<&str>,
) -> Result<Extraction, TransformError> {
    let mut extraction = Extraction::default();
    for (index, family) in [Family::V4, Family::V6].into_iter().enumerate() {
        match response_at(responses, index).and_then(|r| r.error_for_status()) {
            Ok(response) => {
                for line in response.text().lines().map(str::trim).filter(|l| !l.is_empty()) {
                    extraction.push(family, line);
                }
            }
            Err(e) => extraction.problems.push(e),
        }
    }
    Ok(extraction)
}

/// CSV-like feed where the first column of each data line is the range.
pub fn delimited_text(
    responses: &[RawResponse],
    _variant: Option<&str>,
) -> Result<Extraction, TransformError> {
    let response = response_at(responses, 0)?.error_for_status()?;
    Ok(scan_lines(&response.text(), None))
}

/// ASN lookup output, optionally restricted to lines tagged with `variant`.
///
/// # Arguments
///
/// * `responses` - The lookup output as response 0
/// * `variant` - An `AS<digits>` tag; lines tagged with another AS are
///   skipped. Without it every line is kept.
///
/// # Returns
///
/// The scanned ranges, or the fetch error when the lookup failed.
pub fn asn_lookup(
    responses: &[RawResponse],
    variant: Option<&str>,
) -> Result<Extraction, TransformError> {
    let response = response_at(responses, 0)?.error_for_status()?;
    Ok(scan_lines(&response.text(), variant))
}

/// Scan free text line by line for address candidates.
///
/// Blank lines and `#` comments are skipped. Each line is split on whitespace
/// and commas with surrounding double quotes removed. A leading `AS<digits>`
/// token is a tag: when `tag_filter` is set, lines tagged with another AS are
/// skipped. The first token after the tag is the candidate, classified by
/// [`family_of_token`]; candidates that look like neither family are dropped.
pub fn scan_lines(text: &str, tag_filter: Option<&str>) -> Extraction {
    let mut extraction = Extraction::default();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .map(|t| t.trim_matches('"'))
            .filter(|t| !t.is_empty())
            .peekable();

        if let Some(tag) = tokens.next_if(|t| is_as_tag(t)) {
            if let Some(wanted) = tag_filter {
                if !tag.eq_ignore_ascii_case(wanted) {
                    continue;
                }
            }
        }

        let Some(candidate) = tokens.next() else {
            continue;
        };
        if let Some(family) = family_of_token(candidate) {
            extraction.push(family, candidate);
        }
    }
    extraction
}

fn is_as_tag(token: &str) -> bool {
    token.len() > 2
        && token.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("AS"))
        && token[2..].bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::tests::{ok, timed_out};

    #[test]
    fn test_split_text() {
        let v4 = ok("1.1.1.0/24\n103.21.244.0/22\n");
        let v6 = ok("2606:4700:4700::/48");
        let extraction = split_text(&[v4, v6], None).unwrap();
        assert_eq!(extraction.ipv4, vec!["1.1.1.0/24", "103.21.244.0/22"]);
        assert_eq!(extraction.ipv6, vec!["2606:4700:4700::/48"]);
        assert!(extraction.problems.is_empty());
    }

    #[test]
    fn test_split_text_one_family_failed() {
        let extraction = split_text(&[ok("1.1.1.0/24"), timed_out()], None).unwrap();
        assert_eq!(extraction.ipv4, vec!["1.1.1.0/24"]);
        assert!(extraction.ipv6.is_empty());
        assert_eq!(extraction.problems.len(), 1);
    }

    #[test]
    fn test_delimited_text_drops_annotations() {
        let body = "1.2.3.0/24,example.com\n2001:db8::/32,example.com";
        let extraction = delimited_text(&[ok(body)], None).unwrap();
        assert_eq!(extraction.ipv4, vec!["1.2.3.0/24"]);
        assert_eq!(extraction.ipv6, vec!["2001:db8::/32"]);
    }

    #[test]
    fn test_delimited_text_skips_comments() {
        let body = "# Linode IP Ranges\n# prefix,alpha2code,region,city,postal\n\n1.2.3.0/24,US,US-NJ,Cedar Knolls,\n2001:db8::/32,US,US-NJ,Cedar Knolls,";
        let extraction = delimited_text(&[ok(body)], None).unwrap();
        assert_eq!(extraction.ipv4, vec!["1.2.3.0/24"]);
        assert_eq!(extraction.ipv6, vec!["2001:db8::/32"]);
    }

    #[test]
    fn test_delimited_text_keeps_duplicates_in_order() {
        let body = "5.6.7.0/24,NL\n1.2.3.0/24,US\n5.6.7.0/24,NL";
        let extraction = delimited_text(&[ok(body)], None).unwrap();
        assert_eq!(extraction.ipv4, vec!["5.6.7.0/24", "1.2.3.0/24", "5.6.7.0/24"]);
    }

    #[test]
    fn test_asn_lookup_with_matching_tag() {
        let body = "# AS12345 Softlayer IBM\nAS12345 1.2.3.0/24\nAS12345 2001:db8::/32";
        let extraction = asn_lookup(&[ok(body)], Some("AS12345")).unwrap();
        assert_eq!(extraction.ipv4, vec!["1.2.3.0/24"]);
        assert_eq!(extraction.ipv6, vec!["2001:db8::/32"]);
    }

    #[test]
    fn test_asn_lookup_skips_other_tags() {
        let body = "AS12345 1.2.3.0/24\nAS54321 5.6.7.0/24\nas12345 2001:db8::/32";
        let extraction = asn_lookup(&[ok(body)], Some("AS12345")).unwrap();
        assert_eq!(extraction.ipv4, vec!["1.2.3.0/24"]);
        assert_eq!(extraction.ipv6, vec!["2001:db8::/32"]);
    }

    #[test]
    fn test_asn_lookup_untagged_lines() {
        let body = "# AS55293 A2 Hosting\n1.2.3.0/24\n2001:db8::/32";
        let extraction = asn_lookup(&[ok(body)], Some("AS55293")).unwrap();
        assert_eq!(extraction.ipv4, vec!["1.2.3.0/24"]);
        assert_eq!(extraction.ipv6, vec!["2001:db8::/32"]);
    }

    #[test]
    fn test_asn_lookup_quoted_header() {
        let body = "\"AS24940\",\"HETZNER-AS, DE\"\n5.9.0.0/16\n2a01:4f8::/32\n";
        let extraction = asn_lookup(&[ok(body)], Some("AS24940")).unwrap();
        assert_eq!(extraction.ipv4, vec!["5.9.0.0/16"]);
        assert_eq!(extraction.ipv6, vec!["2a01:4f8::/32"]);
    }

    #[test]
    fn test_asn_lookup_invalid_data() {
        let extraction = asn_lookup(&[ok("Invalid data")], Some("AS12345")).unwrap();
        assert!(extraction.ipv4.is_empty());
        assert!(extraction.ipv6.is_empty());

        let extraction = asn_lookup(&[ok("# Invalid data")], None).unwrap();
        assert!(extraction.ipv4.is_empty() && extraction.ipv6.is_empty());
    }

    #[test]
    fn test_asn_lookup_timeout() {
        assert!(asn_lookup(&[timed_out()], None).is_err());
    }

    #[test]
    fn test_is_as_tag() {
        assert!(is_as_tag("AS12345"));
        assert!(is_as_tag("as7"));
        assert!(!is_as_tag("AS"));
        assert!(!is_as_tag("ASN123"));
        assert!(!is_as_tag("1.2.3.0/24"));
    }
}
