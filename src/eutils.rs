//! NCBI E-utilities client.
//!
//! Two requests are issued per run:
//! - ESearch (`esearch.fcgi`, JSON) resolves a query to PMIDs
//! - EFetch (`efetch.fcgi`, XML) returns the full records for those PMIDs
//!
//! Any non-success status is returned as [`PubmedError::Api`]; there is no retry.

use crate::error::{PubmedError, Result};
use crate::models::ArticleRecord;
use crate::parser;
use crate::rules::ClassifierRules;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

/// E-utilities base URL
pub const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/";

/// Database queried by both endpoints
const DATABASE: &str = "pubmed";

/// Default ESearch result cap
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Response bytes shown in debug logs
const DEBUG_PREVIEW_CHARS: usize = 500;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the E-utilities endpoints
    pub base_url: String,
    /// Optional NCBI API key
    pub api_key: Option<String>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: EUTILS_BASE_URL.to_string(),
            api_key: None,
            user_agent: format!("rustpubmed/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// E-utilities client
pub struct PubmedClient {
    client: Client,
    search_url: Url,
    fetch_url: Url,
    api_key: Option<String>,
}

impl PubmedClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut base = Url::parse(&config.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| PubmedError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            search_url: base.join("esearch.fcgi")?,
            fetch_url: base.join("efetch.fcgi")?,
            api_key: config.api_key,
        })
    }

    /// Search PubMed and return matching PMIDs in result order
    pub async fn search_ids(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        info!(query = %query, max_results, "Searching PubMed");

        let mut params = vec![
            ("db", DATABASE.to_string()),
            ("term", query.to_string()),
            ("retmode", "json".to_string()),
            ("retmax", max_results.to_string()),
        ];
        self.push_api_key(&mut params);

        let body = self.get(self.search_url.clone(), &params).await?;
        debug!(body = %preview(&body), "ESearch response");

        let response: ESearchResponse = serde_json::from_str(&body)?;
        let ids = response.esearchresult.idlist;

        info!(count = ids.len(), "Search complete");
        Ok(ids)
    }

    /// Fetch the raw EFetch XML for a batch of PMIDs
    pub async fn fetch_xml(&self, ids: &[String]) -> Result<String> {
        let mut params = vec![
            ("db", DATABASE.to_string()),
            ("id", ids.join(",")),
            ("retmode", "xml".to_string()),
        ];
        self.push_api_key(&mut params);

        self.get(self.fetch_url.clone(), &params).await
    }

    /// Fetch and parse records for a batch of PMIDs.
    ///
    /// An empty batch returns immediately without a request.
    pub async fn fetch_articles(
        &self,
        ids: &[String],
        rules: &ClassifierRules,
    ) -> Result<Vec<ArticleRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        info!(count = ids.len(), "Fetching article details");
        let xml = self.fetch_xml(ids).await?;
        parser::parse_articles(&xml, rules)
    }

    fn push_api_key(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
    }

    async fn get(&self, url: Url, params: &[(&str, String)]) -> Result<String> {
        debug!(url = %url, "GET");
        let response = self.client.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PubmedError::Api {
                code: status.as_u16(),
                message: format!("E-utilities request failed: {}", status),
            });
        }

        Ok(response.text().await?)
    }
}

// === ESearch Response Types ===

#[derive(Debug, Default, Deserialize)]
struct ESearchResponse {
    #[serde(default)]
    esearchresult: ESearchResult,
}

#[derive(Debug, Default, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

fn preview(body: &str) -> String {
    body.chars().take(DEBUG_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let client = PubmedClient::new(ClientConfig::default()).expect("client");
        assert_eq!(
            client.search_url.as_str(),
            "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi"
        );
        assert_eq!(
            client.fetch_url.as_str(),
            "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi"
        );
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        let config = ClientConfig {
            base_url: "http://127.0.0.1:8080/eutils".to_string(),
            ..Default::default()
        };
        let client = PubmedClient::new(config).expect("client");
        assert_eq!(
            client.search_url.as_str(),
            "http://127.0.0.1:8080/eutils/esearch.fcgi"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(PubmedClient::new(config), Err(PubmedError::Url(_))));
    }

    #[test]
    fn test_esearch_response_defaults() {
        let full: ESearchResponse =
            serde_json::from_str(r#"{"esearchresult": {"count": "2", "idlist": ["111", "222"]}}"#)
                .expect("json");
        assert_eq!(full.esearchresult.idlist, vec!["111", "222"]);

        let empty: ESearchResponse = serde_json::from_str("{}").expect("json");
        assert!(empty.esearchresult.idlist.is_empty());
    }

    #[test]
    fn test_preview_is_char_safe() {
        let body = "é".repeat(600);
        assert_eq!(preview(&body).chars().count(), 500);
    }

    #[tokio::test]
    async fn test_fetch_empty_ids_skips_request() {
        let config = ClientConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            ..Default::default()
        };
        let client = PubmedClient::new(config).expect("client");
        let rules = ClassifierRules::builtin().expect("rules");
        let articles = client.fetch_articles(&[], &rules).await.expect("no request");
        assert!(articles.is_empty());
    }
}
