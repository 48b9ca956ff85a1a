//! Download-page scanning for providers that publish their data behind a link.
//!
//! The Azure service tag page does not serve the JSON itself. The current
//! file name changes every week, so the link has to be discovered from the
//! page before the data can be fetched.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

static JSON_DOWNLOAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https://download\.microsoft\.com/[^"'\s<>]+\.json"#)
        .expect("Invalid download link regex")
});

static ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("Invalid anchor selector"));

/// Find the JSON download link in a download page.
///
/// Anchors are checked first; the page often only embeds the link in script
/// data, so the raw text is scanned as a fallback.
pub fn download_link(page: &str) -> Option<String> {
    let document = Html::parse_document(page);
    let from_anchor = document
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .find(|href| {
            JSON_DOWNLOAD
                .find(href)
                .is_some_and(|m| m.start() == 0 && m.end() == href.len())
        })
        .map(str::to_string);

    let link = from_anchor.or_else(|| {
        JSON_DOWNLOAD
            .find(page)
            .map(|m| m.as_str().to_string())
    })?;

    // Reject anything the URL parser would not accept for the follow-up fetch.
    let link = Url::parse(&link).ok()?.to_string();
    debug!(%link, "Found download link");
    Some(link)
}
