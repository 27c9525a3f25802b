//! Pinecone integrated-inference search client.
//!
//! Queries go to the data-plane "search records" endpoint, which embeds the
//! query text server-side and returns ranked records with projected fields.

use super::{RecordSearch, SearchHit, SearchQuery};
use crate::config::IndexSettings;
use crate::error::{OrgSearchError, Result};
use crate::retry::{retry_with_backoff, RetryPolicy};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

const API_KEY_HEADER: &str = "Api-Key";
const API_VERSION_HEADER: &str = "X-Pinecone-API-Version";

/// Search client bound to one index host and namespace.
pub struct PineconeClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    api_version: String,
    namespace: String,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct SearchRecordsRequest<'a> {
    query: SearchRecordsQuery<'a>,
    fields: &'a [String],
}

#[derive(Serialize)]
struct SearchRecordsQuery<'a> {
    inputs: QueryInputs<'a>,
    top_k: usize,
}

#[derive(Serialize)]
struct QueryInputs<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SearchRecordsResponse {
    result: SearchRecordsResult,
}

#[derive(Deserialize)]
struct SearchRecordsResult {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct IndexDescription {
    host: String,
}

fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(60))
        .build()?)
}

fn api_key(settings: &IndexSettings) -> Result<&str> {
    settings
        .api_key
        .as_deref()
        .ok_or_else(|| OrgSearchError::Config("PINECONE_API_KEY is not set".to_string()))
}

/// Parse an index host, adding `https://` when no scheme is given.
pub fn normalize_host(host: &str) -> Result<Url> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(OrgSearchError::Config("Index host is empty".to_string()));
    }

    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };

    Url::parse(&with_scheme)
        .map_err(|e| OrgSearchError::Config(format!("Invalid index host '{}': {}", host, e)))
}

/// Look up an index's data-plane host through the control plane.
#[instrument(skip(http, settings))]
pub async fn resolve_host(http: &reqwest::Client, settings: &IndexSettings) -> Result<String> {
    let name = settings.name.as_deref().ok_or_else(|| {
        OrgSearchError::Config("Neither PINECONE_HOST nor PINECONE_INDEX is set".to_string())
    })?;

    let mut url = Url::parse(&settings.control_plane_url)
        .map_err(|e| OrgSearchError::Config(format!("Invalid control plane URL: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| OrgSearchError::Config("Invalid control plane URL".to_string()))?
        .pop_if_empty()
        .extend(["indexes", name]);

    let resp = http
        .get(url)
        .header(API_KEY_HEADER, api_key(settings)?)
        .header(API_VERSION_HEADER, &settings.api_version)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(OrgSearchError::Search(format!(
            "Describe index '{}' returned {}: {}",
            name, status, body
        )));
    }

    let description: IndexDescription = resp.json().await?;
    info!("Resolved index '{}' to host {}", name, description.host);
    Ok(description.host)
}

impl PineconeClient {
    /// Create a client for the configured index, resolving its host if needed.
    pub async fn connect(settings: &IndexSettings) -> Result<Self> {
        let http = http_client()?;
        let host = match settings.host.as_deref() {
            Some(host) => host.to_string(),
            None => resolve_host(&http, settings).await?,
        };
        Self::with_http_client(http, &host, settings)
    }

    /// Create a client for a known host.
    pub fn new(host: &str, settings: &IndexSettings) -> Result<Self> {
        Self::with_http_client(http_client()?, host, settings)
    }

    fn with_http_client(http: reqwest::Client, host: &str, settings: &IndexSettings) -> Result<Self> {
        Ok(Self {
            http,
            base_url: normalize_host(host)?,
            api_key: api_key(settings)?.to_string(),
            api_version: settings.api_version.clone(),
            namespace: settings.namespace.clone(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `{host}/records/namespaces/{namespace}/search`
    pub fn search_url(&self) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| OrgSearchError::Config(format!("Invalid index host: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["records", "namespaces", self.namespace.as_str(), "search"]);
        Ok(url)
    }

    async fn search_once(&self, url: Url, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let body = SearchRecordsRequest {
            query: SearchRecordsQuery {
                inputs: QueryInputs { text: &query.text },
                top_k: query.top_k,
            },
            fields: &query.fields,
        };

        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(API_VERSION_HEADER, &self.api_version)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(OrgSearchError::Search(format!(
                "Search returned {}: {}",
                status, body
            )));
        }

        let parsed: SearchRecordsResponse = resp.json().await?;
        Ok(parsed.result.hits)
    }
}

#[async_trait]
impl RecordSearch for PineconeClient {
    #[instrument(skip(self, query), fields(top_k = query.top_k))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let url = self.search_url()?;
        debug!("Searching {} for: {}", url, query.text);

        let hits = retry_with_backoff(&self.retry, "record search", || {
            self.search_once(url.clone(), query)
        })
        .await?;

        info!("Index returned {} hits", hits.len());
        Ok(hits)
    }
}
