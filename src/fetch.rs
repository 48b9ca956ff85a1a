//! Response acquisition.
//!
//! Every provider gets exactly one attempt per URL, bounded by the client
//! timeout. Failures are not raised: they are recorded on the returned
//! [`RawResponse`] so the transform layer can degrade that provider alone.

use crate::error::FetchFailure;
use crate::models::RawResponse;
use crate::providers::{ProviderSpec, html};
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Build the shared HTTP client.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
}

/// Map a reqwest error onto the failure indicator extractors understand.
fn classify(e: &reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else if let Some(status) = e.status() {
        FetchFailure::Status(status.as_u16())
    } else {
        FetchFailure::Connect(e.to_string())
    }
}

/// GET one URL and capture the outcome.
#[instrument(level = "debug", skip(client))]
pub async fn fetch_one(client: &Client, url: &str) -> RawResponse {
    let result = async {
        let response = client.get(url).send().await?.error_for_status()?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok::<_, reqwest::Error>((status, body.to_vec()))
    }
    .await;

    match result {
        Ok((status, body)) => {
            debug!(%url, status, bytes = body.len(), "Fetched");
            RawResponse {
                url: url.to_string(),
                status: Some(status),
                body,
                failure: None,
            }
        }
        Err(e) => {
            let failure = classify(&e);
            warn!(%url, error = %failure, "Fetch failed");
            RawResponse::failed(url, failure)
        }
    }
}

/// Fetch every source of `spec` in order, plus the follow-up download when
/// the format needs one.
#[instrument(level = "info", skip_all, fields(provider = spec.id))]
pub async fn fetch_provider(client: &Client, spec: &ProviderSpec) -> Vec<RawResponse> {
    let mut responses = Vec::with_capacity(spec.sources.len() + 1);
    for url in spec.sources {
        responses.push(fetch_one(client, url).await);
    }

    if spec.format.needs_follow_up() {
        let link = responses
            .first()
            .filter(|page| page.failure.is_none())
            .and_then(|page| {
                let text = page.text();
                let link = html::download_link(&text);
                if link.is_none() {
                    warn!(page = %truncate_for_log(&text, 200), "No download link on page");
                }
                link
            });
        if let Some(link) = link {
            responses.push(fetch_one(client, &link).await);
        }
    }
    responses
}
