//! SoundCloud search client.
//!
//! Only tracks the uploader flagged as downloadable are considered.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::credential::CredentialSource;
use super::{build_url, get_json, ProviderError, ProviderKind, ProviderQuery, SearchProvider};

pub const SOUNDCLOUD_API_URL: &str = "https://api-v2.soundcloud.com";

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub collection: Vec<ScTrack>,
}

#[derive(Debug, Deserialize)]
pub struct ScTrack {
    #[serde(default)]
    pub downloadable: bool,
    pub download_url: Option<String>,
}

pub struct SoundCloudClient {
    http: reqwest::Client,
    base_url: String,
    credential: CredentialSource,
}

impl SoundCloudClient {
    pub fn new(http: reqwest::Client, credential: CredentialSource) -> Self {
        Self::with_base_url(http, credential, SOUNDCLOUD_API_URL)
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

/// Picks the first downloadable track and appends the client id to its
/// download URL.
pub fn pick_download(response: &SearchResponse, client_id: &str) -> Option<String> {
    response
        .collection
        .iter()
        .filter(|t| t.downloadable)
        .find_map(|t| t.download_url.as_deref().filter(|u| !u.is_empty()))
        .map(|url| format!("{}?client_id={}", url, client_id))
}

#[async_trait]
impl SearchProvider for SoundCloudClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::SoundCloud
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
            "/search/tracks",
            &[("q", text.as_str()), ("client_id", client_id.as_str())],
        )?;
        debug!(query = %text, "Searching SoundCloud");

        let response: SearchResponse = get_json(&self.http, url).await?;
        Ok(pick_download(&response, &client_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{serve, Reply};

    fn parse(json: &str) -> SearchResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn picks_first_downloadable() {
        let response = parse(
            r#"{"collection":[
                {"downloadable":false,"download_url":"https://sc/1/download"},
                {"downloadable":true,"download_url":"https://sc/2/download","title":"x"},
                {"downloadable":true,"download_url":"https://sc/3/download"}
            ]}"#,
        );
        assert_eq!(
            pick_download(&response, "cid").as_deref(),
            Some("https://sc/2/download?client_id=cid")
        );
    }

    #[test]
    fn downloadable_without_url_is_skipped() {
        let response = parse(
            r#"{"collection":[{"downloadable":true},{"downloadable":true,"download_url":"https://sc/9"}]}"#,
        );
        assert_eq!(
            pick_download(&response, "cid").as_deref(),
            Some("https://sc/9?client_id=cid")
        );
    }

    #[test]
    fn nothing_downloadable() {
        let response = parse(r#"{"collection":[{"downloadable":false},{"title":"no flag"}]}"#);
        assert!(pick_download(&response, "cid").is_none());
        assert!(pick_download(&parse("{}"), "cid").is_none());
    }

    #[tokio::test]
    async fn missing_credential_skips() {
        let client = SoundCloudClient::new(reqwest::Client::new(), CredentialSource::Unavailable);
        let result = client.find(&ProviderQuery::new("t", "a")).await;
        assert!(matches!(
            result,
            Err(ProviderError::MissingCredential(ProviderKind::SoundCloud))
        ));
    }

    const ONE_DOWNLOADABLE: &str =
        r#"{"collection":[{"downloadable":true,"download_url":"https://sc/7/download"}]}"#;

    #[tokio::test]
    async fn find_searches_with_configured_id() {
        let server = serve(|_| Reply::ok(ONE_DOWNLOADABLE)).await;
        let client = SoundCloudClient::with_base_url(
            reqwest::Client::new(),
            CredentialSource::Configured("cid".to_string()),
            &server.base_url,
        );

        let url = client
            .find(&ProviderQuery::new("One More Time", "Daft Punk"))
            .await
            .unwrap();
        assert_eq!(url.as_deref(), Some("https://sc/7/download?client_id=cid"));
        assert_eq!(
            server.requests()[0].target,
            "/search/tracks?q=Daft+Punk+One+More+Time&client_id=cid"
        );
    }

    #[tokio::test]
    async fn find_discovers_id_before_searching() {
        let server = serve(|target| {
            if target.starts_with("/search/tracks") {
                Reply::ok(ONE_DOWNLOADABLE)
            } else {
                Reply::ok(r#"<script>client_id:"found42"</script>"#)
            }
        })
        .await;
        let credential =
            CredentialSource::configured_or_discover(None, server.url("/home"), false);
        let client =
            SoundCloudClient::with_base_url(reqwest::Client::new(), credential, &server.base_url);

        let url = client.find(&ProviderQuery::new("t", "a")).await.unwrap();
        assert_eq!(url.as_deref(), Some("https://sc/7/download?client_id=found42"));

        let targets: Vec<String> = server.requests().into_iter().map(|r| r.target).collect();
        assert_eq!(targets[0], "/home");
        assert!(targets[1].ends_with("client_id=found42"));
    }
}
