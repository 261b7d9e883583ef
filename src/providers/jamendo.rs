//! Jamendo royalty-free catalog client.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::credential::CredentialSource;
use super::{build_url, get_json, ProviderError, ProviderKind, ProviderQuery, SearchProvider};

pub const JAMENDO_API_URL: &str = "https://api.jamendo.com/v3.0";

#[derive(Debug, Deserialize)]
pub struct TracksResponse {
    #[serde(default)]
    pub results: Vec<JamendoTrack>,
}

#[derive(Debug, Deserialize)]
pub struct JamendoTrack {
    pub audio: Option<String>,
}

pub struct JamendoClient {
    http: reqwest::Client,
    base_url: String,
    credential: CredentialSource,
}

impl JamendoClient {
    /// Jamendo has no public page to discover an id from; without a
    /// configured one the provider is skipped.
    pub fn new(http: reqwest::Client, client_id: Option<String>) -> Self {
        Self::with_base_url(http, CredentialSource::configured(client_id), JAMENDO_API_URL)
    }

    pub fn with_base_url(
        http: reqwest::Client,
        credential: CredentialSource,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            credential,
        }
    }
}

/// Every Jamendo track is free to download; the first audio URL wins.
pub fn pick_audio(response: &TracksResponse) -> Option<String> {
    response
        .results
        .iter()
        .find_map(|t| t.audio.as_deref().filter(|u| !u.is_empty()))
        .map(str::to_string)
}

#[async_trait]
impl SearchProvider for JamendoClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Jamendo
    }

    async fn find(&self, query: &ProviderQuery) -> Result<Option<String>, ProviderError> {
        let client_id = self
            .credential
            .client_id(&self.http)
            .await
            .ok_or(ProviderError::MissingCredential(self.kind()))?;

        let text = query.text();
        let url = build_url(
            &self.base_url,
            "/tracks/",
            &[
                ("client_id", client_id.as_str()),
                ("format", "json"),
                ("limit", "1"),
                ("search", text.as_str()),
            ],
        )?;
        debug!(query = %text, "Searching Jamendo");

        let response: TracksResponse = get_json(&self.http, url).await?;
        Ok(pick_audio(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{serve, Reply};

    #[test]
    fn first_audio_url() {
        let response: TracksResponse = serde_json::from_str(
            r#"{"headers":{"status":"success"},"results":[{"name":"x","audio":"https://jm/1.mp3"}]}"#,
        )
        .unwrap();
        assert_eq!(pick_audio(&response).as_deref(), Some("https://jm/1.mp3"));
    }

    #[test]
    fn empty_results() {
        let response: TracksResponse = serde_json::from_str(r#"{"results":[]}"#).unwrap();
        assert!(pick_audio(&response).is_none());

        let response: TracksResponse = serde_json::from_str(r#"{"results":[{"audio":""}]}"#).unwrap();
        assert!(pick_audio(&response).is_none());
    }

    #[tokio::test]
    async fn no_client_id_skips() {
        let client = JamendoClient::new(reqwest::Client::new(), None);
        let result = client.find(&ProviderQuery::new("t", "a")).await;
        assert!(matches!(result, Err(ProviderError::MissingCredential(_))));
    }

    fn client(base_url: &str) -> JamendoClient {
        JamendoClient::with_base_url(
            reqwest::Client::new(),
            CredentialSource::Configured("jm".to_string()),
            base_url,
        )
    }

    #[tokio::test]
    async fn find_queries_tracks_endpoint() {
        let server = serve(|_| Reply::ok(r#"{"results":[{"audio":"https://jm/9.mp3"}]}"#)).await;

        let url = client(&server.base_url)
            .find(&ProviderQuery::new("Song", "Artist"))
            .await
            .unwrap();
        assert_eq!(url.as_deref(), Some("https://jm/9.mp3"));
        assert_eq!(
            server.requests()[0].target,
            "/tracks/?client_id=jm&format=json&limit=1&search=Artist+Song"
        );
    }

    #[tokio::test]
    async fn error_status_is_api_error() {
        let server = serve(|_| Reply::status(500, "upstream down")).await;

        let result = client(&server.base_url)
            .find(&ProviderQuery::new("t", "a"))
            .await;
        match result {
            Err(ProviderError::Api(status, body)) => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream down");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }
}
