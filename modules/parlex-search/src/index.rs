use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use parlex_common::SpeechHit;

const SEARCH_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Query-by-text-field contract for a speech search backend.
///
/// The aggregator depends only on this trait, not on any particular
/// backend's client API. Connectivity and auth failures propagate; partial
/// silent results are never returned.
#[async_trait]
pub trait SpeechIndex: Send + Sync {
    async fn search(
        &self,
        index: &str,
        query: &str,
        limit: usize,
        date_range: (NaiveDate, NaiveDate),
    ) -> Result<Vec<SpeechHit>>;
}

/// Elasticsearch implementation speaking the `_search` HTTP API with
/// API-key auth and a semantic query on the `speech_text` field.
pub struct EsSpeechIndex {
    endpoint: String,
    api_key: String,
    http: reqwest::Client,
}

impl EsSpeechIndex {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    fn query_body(query: &str, limit: usize) -> serde_json::Value {
        // TODO: add a date range filter once the index mapping carries a
        // filterable date field
        json!({
            "query": { "semantic": { "field": "speech_text", "query": query } },
            "size": limit,
            "_source": [
                "speech_text.text",
                "speaker_name",
                "speaker_party",
                "speaker_role",
                "debate_title",
                "date",
            ],
        })
    }
}

#[async_trait]
impl SpeechIndex for EsSpeechIndex {
    async fn search(
        &self,
        index: &str,
        query: &str,
        limit: usize,
        _date_range: (NaiveDate, NaiveDate),
    ) -> Result<Vec<SpeechHit>> {
        let url = format!("{}/{}/_search", self.endpoint, index);

        debug!(index, limit, "Speech index search");

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("ApiKey {}", self.api_key))
            .timeout(SEARCH_REQUEST_TIMEOUT)
            .json(&Self::query_body(query, limit))
            .send()
            .await
            .with_context(|| format!("Search request to index '{index}' failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Search error on index '{}' ({}): {}",
                index,
                status,
                error_text
            ));
        }

        let body: EsResponse = response
            .json()
            .await
            .context("Malformed search response body")?;

        Ok(body
            .hits
            .hits
            .into_iter()
            .map(|hit| SpeechHit {
                speech_text: hit.source.speech_text.text,
                speaker_name: hit.source.speaker_name,
                speaker_party: hit.source.speaker_party,
                speaker_role: hit.source.speaker_role,
                debate_title: hit.source.debate_title,
                date: hit.source.date,
                house: None,
            })
            .collect())
    }
}

// --- Elasticsearch response shape ---

#[derive(Deserialize)]
struct EsResponse {
    hits: EsHits,
}

#[derive(Deserialize)]
struct EsHits {
    hits: Vec<EsHit>,
}

#[derive(Deserialize)]
struct EsHit {
    #[serde(rename = "_source")]
    source: EsSource,
}

#[derive(Deserialize)]
struct EsSource {
    speech_text: EsSpeechText,
    speaker_name: String,
    #[serde(default)]
    speaker_party: Option<String>,
    #[serde(default)]
    speaker_role: Option<String>,
    debate_title: String,
    date: String,
}

#[derive(Deserialize)]
struct EsSpeechText {
    text: String,
}
