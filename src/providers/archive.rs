//! Extractor for providers that ship their ranges as a ZIP archive.

use super::response_at;
use crate::error::TransformError;
use crate::models::{Extraction, Family, RawResponse};
use std::io::{Cursor, Read};
use tracing::debug;

/// Family a member holds, judged by its file name.
fn member_family(name: &str) -> Option<Family> {
    let name = name.to_ascii_lowercase();
    if name.contains("v6") {
        Some(Family::V6)
    } else if name.contains("v4") {
        Some(Family::V4)
    } else {
        None
    }
}

/// Decompress the archive in memory and read one member per family.
///
/// Members are matched by `v4`/`v6` in their name; each non-empty line of a
/// member is one range. A family without a member is recorded as a problem.
pub fn zip_archive(
    responses: &[RawResponse],
    _variant: Option<&str>,
) -> Result<Extraction, TransformError> {
    let response = response_at(responses, 0)?.error_for_status()?;
    let invalid = |source| TransformError::Archive {
        url: response.url.clone(),
        source,
    };

    let mut archive = zip::ZipArchive::new(Cursor::new(response.bytes())).map_err(invalid)?;
    let mut extraction = Extraction::default();
    let mut seen_v4 = false;
    let mut seen_v6 = false;

    for index in 0..archive.len() {
        let mut member = archive.by_index(index).map_err(invalid)?;
        if member.is_dir() {
            continue;
        }
        let name = member.name().to_string();
        let Some(family) = member_family(&name) else {
            debug!(member = %name, "Skipping archive member");
            continue;
        };

        let mut contents = String::new();
        member
            .read_to_string(&mut contents)
            .map_err(|source| TransformError::ArchiveMember {
                member: name.clone(),
                source,
            })?;

        match family {
            Family::V4 => seen_v4 = true,
            Family::V6 => seen_v6 = true,
        }
        for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
            extraction.push(family, line);
        }
    }

    if !seen_v4 {
        extraction.problems.push(TransformError::MissingMember("IPv4"));
    }
    if !seen_v6 {
        extraction.problems.push(TransformError::MissingMember("IPv6"));
    }
    Ok(extraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::tests::{ok, timed_out};
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(members: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, contents) in members {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn zip_response(members: &[(&str, &str)]) -> RawResponse {
        RawResponse::ok("https://example.com/ranges.zip", build_zip(members))
    }

    #[test]
    fn test_zip_archive() {
        let response = zip_response(&[("v4file", "1.2.3.0/24"), ("v6file", "2001:db8::/32")]);
        let extraction = zip_archive(&[response], None).unwrap();
        assert_eq!(extraction.ipv4, vec!["1.2.3.0/24"]);
        assert_eq!(extraction.ipv6, vec!["2001:db8::/32"]);
        assert!(extraction.problems.is_empty());
    }

    #[test]
    fn test_zip_archive_provider_names() {
        let response = zip_response(&[
            ("akamai_ipv4_CIDRs.txt", "1.2.3.0/24\n5.6.7.0/24\n"),
            ("akamai_ipv6_CIDRs.txt", "2001:db8::/32\r\n2001:db8:1::/48\r\n"),
            ("README.txt", "not ranges"),
        ]);
        let extraction = zip_archive(&[response], None).unwrap();
        assert_eq!(extraction.ipv4, vec!["1.2.3.0/24", "5.6.7.0/24"]);
        assert_eq!(extraction.ipv6, vec!["2001:db8::/32", "2001:db8:1::/48"]);
    }

    #[test]
    fn test_zip_archive_missing_member() {
        let response = zip_response(&[("v4file", "1.2.3.0/24")]);
        let extraction = zip_archive(&[response], None).unwrap();
        assert_eq!(extraction.ipv4, vec!["1.2.3.0/24"]);
        assert!(matches!(
            extraction.problems.as_slice(),
            [TransformError::MissingMember("IPv6")]
        ));
    }

    #[test]
    fn test_zip_archive_not_an_archive() {
        let response = ok("1.2.3.0/24\n2001:db8::/32");
        assert!(matches!(
            zip_archive(&[response], None),
            Err(TransformError::Archive { .. })
        ));
    }

    #[test]
    fn test_zip_archive_timeout() {
        assert!(matches!(
            zip_archive(&[timed_out()], None),
            Err(TransformError::Fetch { .. })
        ));
    }

    #[test]
    fn test_member_family() {
        assert_eq!(member_family("akamai_ipv4_CIDRs.txt"), Some(Family::V4));
        assert_eq!(member_family("akamai_IPV6_CIDRs.txt"), Some(Family::V6));
        assert_eq!(member_family("notes.txt"), None);
    }
}
