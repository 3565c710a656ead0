// OMDb API poster lookup.
//
// One GET per title: `?apikey=KEY&t=TITLE`. The response carries a `Poster`
// field holding a URL or the literal "N/A". Any failure (network, status,
// JSON, missing field) is logged at debug and reported as no poster.
//
// API docs: https://www.omdbapi.com/

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::traits::PosterLookup;
use crate::output::truncate_chars;

/// Default OMDb endpoint.
pub const DEFAULT_OMDB_URL: &str = "https://www.omdbapi.com/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OmdbPosterLookup {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbPosterLookup {
    pub fn new(base_url: &str, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for OMDb")?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        })
    }

    async fn fetch(&self, title: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str()), ("t", title)])
            .send()
            .await
            .context("Failed to call OMDb API")?;

        if !response.status().is_success() {
            anyhow::bail!("OMDb API returned {}", response.status());
        }

        let body: OmdbResponse = response
            .json()
            .await
            .context("Failed to parse OMDb API response")?;

        Ok(poster_from_response(body))
    }
}

#[async_trait]
impl PosterLookup for OmdbPosterLookup {
    async fn poster_url(&self, title: &str) -> Option<String> {
        match self.fetch(title).await {
            Ok(poster) => poster,
            Err(e) => {
                debug!(
                    error = %e,
                    title = %truncate_chars(title, 50),
                    "Poster lookup failed"
                );
                None
            }
        }
    }
}

fn poster_from_response(body: OmdbResponse) -> Option<String> {
    body.poster
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty() && p != "N/A")
}

#[derive(Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Poster")]
    poster: Option<String>,
}
