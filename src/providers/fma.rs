//! Free Music Archive client.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{build_url, get_json, ProviderError, ProviderKind, ProviderQuery, SearchProvider};

pub const FMA_URL: &str = "https://freemusicarchive.org";

#[derive(Debug, Deserialize)]
pub struct TracksResponse {
    #[serde(default)]
    pub dataset: Vec<FmaTrack>,
}

#[derive(Debug, Deserialize)]
pub struct FmaTrack {
    pub track_url: Option<String>,
}

pub struct FmaClient {
    http: reqwest::Client,
    base_url: String,
}

impl FmaClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, FMA_URL)
    }

    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

pub fn pick_track(response: &TracksResponse) -> Option<String> {
    response
        .dataset
        .first()
        .and_then(|t| t.track_url.as_deref())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl SearchProvider for FmaClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::FreeMusicArchive
    }

    async fn find(&self, query: &ProviderQuery) -> Result<Option<String>, ProviderError> {
        let text = query.text();
        let url = build_url(
            &self.base_url,
            "/api/get/tracks.json",
            &[("track_title", text.as_str())],
        )?;
        debug!(query = %text, "Searching Free Music Archive");

        let response: TracksResponse = get_json(&self.http, url).await?;
        Ok(pick_track(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{serve, Reply};

    #[test]
    fn first_dataset_entry() {
        let response: TracksResponse = serde_json::from_str(
            r#"{"total":"2","dataset":[{"track_url":"https://fma/t/1"},{"track_url":"https://fma/t/2"}]}"#,
        )
        .unwrap();
        assert_eq!(pick_track(&response).as_deref(), Some("https://fma/t/1"));
    }

    #[test]
    fn missing_dataset() {
        let response: TracksResponse = serde_json::from_str(r#"{"errors":["bad key"]}"#).unwrap();
        assert!(pick_track(&response).is_none());
    }

    #[tokio::test]
    async fn find_searches_by_title() {
        let server = serve(|_| Reply::ok(r#"{"dataset":[{"track_url":"https://fma/t/5"}]}"#)).await;
        let client = FmaClient::with_base_url(reqwest::Client::new(), &server.base_url);

        let url = client.find(&ProviderQuery::new("Song", "Artist")).await.unwrap();
        assert_eq!(url.as_deref(), Some("https://fma/t/5"));
        assert_eq!(
            server.requests()[0].target,
            "/api/get/tracks.json?track_title=Artist+Song"
        );
    }
}
