//! Helpers for labels, timestamps, address classification, logging and the file system.

use crate::models::Family;
use chrono::Local;
use std::fs as stdfs;
use std::io;
use tokio::fs;
use tracing::{info, instrument};

/// Format used for `last_updated` when the provider supplies no date.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Turn a provider identifier into its display label.
///
/// Underscores become spaces, and every letter that follows a non-letter is
/// upper-cased while the rest are lower-cased.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(provider_label("google_cloud"), "Google Cloud");
/// assert_eq!(provider_label("a2hosting"), "A2Hosting");
/// ```
pub fn provider_label(id: &str) -> String {
    let mut label = String::with_capacity(id.len());
    let mut prev_is_letter = false;
    for c in id.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_is_letter {
                label.extend(c.to_lowercase());
            } else {
                label.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            label.push(c);
            prev_is_letter = false;
        }
    }
    label
}

/// Current local time, second precision.
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Classify a provider-reported string as IPv6 if it contains a colon, IPv4 otherwise.
///
/// Used for structured feeds where every entry is meant to be an address, so
/// malformed values still land in a list instead of being dropped.
pub fn family_by_shape(value: &str) -> Family {
    if value.contains(':') {
        Family::V6
    } else {
        Family::V4
    }
}

/// Classify a token scanned out of free text. Tokens that look like neither
/// family (words, tags, headers) yield `None`.
pub fn family_of_token(token: &str) -> Option<Family> {
    if token.contains(':') {
        Some(Family::V6)
    } else if token.contains('.') {
        Some(Family::V4)
    } else {
        None
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last char boundary before `max` bytes with an
/// ellipsis and the number of dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_label() {
        assert_eq!(provider_label("aws"), "Aws");
        assert_eq!(provider_label("google_cloud"), "Google Cloud");
        assert_eq!(provider_label("softlayer_ibm"), "Softlayer Ibm");
        assert_eq!(provider_label("digitalocean"), "Digitalocean");
        assert_eq!(provider_label("a2hosting"), "A2Hosting");
        assert_eq!(provider_label("apple_icloud"), "Apple Icloud");
    }

    #[test]
    fn test_timestamp_now_shape() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], "T");
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_family_by_shape() {
        assert_eq!(family_by_shape("1.2.3.0/24"), Family::V4);
        assert_eq!(family_by_shape("2001:db8::/32"), Family::V6);
        assert_eq!(family_by_shape("invalid_ip"), Family::V4);
    }

    #[test]
    fn test_family_of_token() {
        assert_eq!(family_of_token("1.2.3.0/24"), Some(Family::V4));
        assert_eq!(family_of_token("2001:db8::/32"), Some(Family::V6));
        assert_eq!(family_of_token("::ffff:1.2.3.4"), Some(Family::V6));
        assert_eq!(family_of_token("AS12345"), None);
        assert_eq!(family_of_token("Invalid"), None);
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 100), "short");
        let long = "a".repeat(500);
        let result = truncate_for_log(&long, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_char_boundary() {
        let s = "ééé";
        assert_eq!(truncate_for_log(s, 3), "é…(+4 bytes)");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let nested = nested.to_str().unwrap();
        ensure_writable_dir(nested).await.unwrap();
        assert!(std::path::Path::new(nested).is_dir());
    }
}
