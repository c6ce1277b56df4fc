//! Azure AI Search client.
//!
//! Issues keyword and hybrid (keyword + vector) queries against one
//! index. Rank fusion for hybrid queries happens inside the service;
//! this client only builds the request and parses the hit list.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::SearchConfig;
use crate::errors::BackendError;

use super::{SearchBackend, SearchHit, SearchRequest};

#[derive(Clone)]
pub struct AzureSearchClient {
    endpoint: String,
    api_key: String,
    index: String,
    api_version: String,
    vector_field: String,
    client: Client,
}

impl AzureSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            index: config.index.clone(),
            api_version: config.api_version.clone(),
            vector_field: config.vector_field.clone(),
            client,
        })
    }

    fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint, self.index, self.api_version
        )
    }

    fn build_payload(&self, request: &SearchRequest) -> Value {
        let mut payload = json!({
            "search": request.query_text,
            "top": request.top,
            "select": "title,content,url",
            "searchFields": "title,content",
            "filter": "length(content) gt 0",
        });

        if let Some(vector) = &request.vector {
            payload["vectorQueries"] = json!([{
                "kind": "vector",
                "vector": vector,
                "k": request.vector_k,
                "fields": self.vector_field,
            }]);
        }

        payload
    }
}

#[async_trait]
impl SearchBackend for AzureSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, BackendError> {
        let payload = self.build_payload(request);

        let response = self
            .client
            .post(self.search_url())
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        let body: Value = response.json().await?;
        parse_hits(&body)
    }
}

fn parse_hits(body: &Value) -> Result<Vec<SearchHit>, BackendError> {
    let items = body
        .get("value")
        .and_then(|v| v.as_array())
        .ok_or_else(|| BackendError::Malformed("missing 'value' array".to_string()))?;

    let mut hits = Vec::with_capacity(items.len());
    for item in items {
        let title = item.get("title").and_then(|v| v.as_str()).unwrap_or("");
        let content = item.get("content").and_then(|v| v.as_str()).unwrap_or("");
        let url = item.get("url").and_then(|v| v.as_str()).unwrap_or("");
        let score = item
            .get("@search.score")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let kind = item
            .get("kind")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        if content.is_empty() {
            continue;
        }

        hits.push(SearchHit {
            title: title.to_string(),
            content: content.to_string(),
            url: url.to_string(),
            score,
            kind,
        });
    }

    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AzureSearchClient {
        let config = SearchConfig {
            endpoint: "https://unit.search.windows.net/".to_string(),
            api_key: "key".to_string(),
            index: "docs".to_string(),
            ..Default::default()
        };
        AzureSearchClient::new(&config).unwrap()
    }

    #[test]
    fn search_url_strips_trailing_slash() {
        assert_eq!(
            client().search_url(),
            "https://unit.search.windows.net/indexes/docs/search?api-version=2024-07-01"
        );
    }

    #[test]
    fn classic_payload_has_no_vector_queries() {
        let payload = client().build_payload(&SearchRequest {
            query_text: "sso setup".to_string(),
            top: 10,
            vector: None,
            vector_k: 50,
        });
        assert_eq!(payload["search"], "sso setup");
        assert_eq!(payload["top"], 10);
        assert_eq!(payload["select"], "title,content,url");
        assert!(payload.get("vectorQueries").is_none());
    }

    #[test]
    fn hybrid_payload_carries_vector_leg() {
        let payload = client().build_payload(&SearchRequest {
            query_text: "sso setup".to_string(),
            top: 10,
            vector: Some(vec![0.1, 0.2]),
            vector_k: 50,
        });
        let leg = &payload["vectorQueries"][0];
        assert_eq!(leg["kind"], "vector");
        assert_eq!(leg["k"], 50);
        assert_eq!(leg["fields"], "content_vector");
    }

    #[test]
    fn parse_hits_reads_search_score_and_drops_empty_content() {
        let body = json!({
            "value": [
                {"title": "SSO", "content": "steps", "url": "https://kb/sso", "@search.score": 12.5},
                {"title": "Empty", "content": "", "url": "https://kb/empty", "@search.score": 11.0},
            ]
        });
        let hits = parse_hits(&body).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "SSO");
        assert_eq!(hits[0].score, 12.5);
    }

    #[test]
    fn parse_hits_rejects_missing_value() {
        let err = parse_hits(&json!({"error": "boom"})).unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }
}
