//! Store-apps search client.
//!
//! Missing fields in the catalogue response fall back to `Unknown` or empty
//! values. A response that is not `status == "OK"` or carries no apps is an
//! empty result, not an error.

use crate::traits::AppSearch;
use async_trait::async_trait;
use dashboard_core::{DashboardError, DashboardResult};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

const UNKNOWN: &str = "Unknown";
const DEFAULT_QUERY: &str = "popular";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppRecord {
    pub title: String,
    pub icon: String,
    pub developer: String,
    pub category: String,
    pub rating: String,
    pub downloads: String,
    pub description: String,
    pub screenshots: Vec<String>,
}

pub struct StoreAppsClient {
    client: Client,
    url: String,
    api_key: String,
    region: String,
    language: String,
}

impl StoreAppsClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            api_key: api_key.into(),
            region: "us".to_string(),
            language: "en".to_string(),
        }
    }

    fn host(&self) -> Option<&str> {
        let rest = self.url.split_once("://").map_or(self.url.as_str(), |(_, r)| r);
        rest.split('/').next().filter(|h| !h.is_empty())
    }
}

#[async_trait]
impl AppSearch for StoreAppsClient {
    async fn search(&self, query: &str) -> DashboardResult<Vec<AppRecord>> {
        let query = match query.trim() {
            "" => DEFAULT_QUERY,
            q => q,
        };

        let mut request = self
            .client
            .get(&self.url)
            .query(&[
                ("q", query),
                ("region", self.region.as_str()),
                ("language", self.language.as_str()),
            ])
            .header("x-rapidapi-key", &self.api_key);
        if let Some(host) = self.host() {
            request = request.header("x-rapidapi-host", host);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DashboardError::Upstream(format!("HTTP request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(DashboardError::Upstream(format!(
                "Failed to fetch data: {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DashboardError::UpstreamResponse(format!("Failed to parse response: {}", e)))?;
        let apps = parse_search_response(&body);
        tracing::debug!("App search for '{}' returned {} apps", query, apps.len());
        Ok(apps)
    }
}

impl std::fmt::Debug for StoreAppsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreAppsClient")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

pub fn parse_search_response(body: &Value) -> Vec<AppRecord> {
    if body.get("status").and_then(Value::as_str) != Some("OK") {
        return Vec::new();
    }
    let Some(apps) = body.pointer("/data/apps").and_then(Value::as_array) else {
        return Vec::new();
    };
    apps.iter().map(parse_app).collect()
}

fn parse_app(app: &Value) -> AppRecord {
    let text = |field: &str, fallback: &str| {
        app.get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback)
            .to_string()
    };

    let rating = match app.get("rating") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => "0".to_string(),
    };

    let screenshots = app
        .get("photos")
        .and_then(Value::as_array)
        .map(|photos| {
            photos
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    AppRecord {
        title: text("app_name", UNKNOWN),
        icon: text("app_icon", ""),
        developer: text("app_developer", UNKNOWN),
        category: text("app_category", UNKNOWN),
        rating,
        downloads: text("num_downloads", UNKNOWN),
        description: text("app_description", ""),
        screenshots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_fills_defaults() {
        let body = json!({
            "status": "OK",
            "data": {"apps": [
                {
                    "app_name": "Craft Builder",
                    "app_icon": "https://img/icon.png",
                    "app_developer": "Blocky Inc",
                    "app_category": "Simulation",
                    "rating": 4.5,
                    "num_downloads": "1,000,000+",
                    "app_description": "Build things",
                    "photos": ["https://img/1.png", "https://img/2.png"]
                },
                {}
            ]}
        });

        let apps = parse_search_response(&body);
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].title, "Craft Builder");
        assert_eq!(apps[0].rating, "4.5");
        assert_eq!(apps[0].screenshots.len(), 2);

        assert_eq!(apps[1].title, "Unknown");
        assert_eq!(apps[1].developer, "Unknown");
        assert_eq!(apps[1].icon, "");
        assert_eq!(apps[1].rating, "0");
        assert_eq!(apps[1].downloads, "Unknown");
        assert!(apps[1].screenshots.is_empty());
    }

    #[test]
    fn test_parse_non_ok_or_empty_is_empty() {
        assert!(parse_search_response(&json!({"status": "ERROR"})).is_empty());
        assert!(parse_search_response(&json!({"status": "OK", "data": {}})).is_empty());
        assert!(parse_search_response(&json!({"status": "OK", "data": {"apps": []}})).is_empty());
    }

    #[test]
    fn test_host_header_from_url() {
        let client = StoreAppsClient::new("https://store-apps.p.rapidapi.com/search", "k");
        assert_eq!(client.host(), Some("store-apps.p.rapidapi.com"));
    }
}
