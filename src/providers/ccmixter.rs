//! ccMixter client, restricted to attribution licenses.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{build_url, get_json, ProviderError, ProviderKind, ProviderQuery, SearchProvider};

pub const CCMIXTER_URL: &str = "https://ccmixter.org";

const LICENSES: &str = "cc-by,cc-by-sa";

#[derive(Debug, Deserialize)]
pub struct Upload {
    #[serde(rename = "downloadUrl")]
    pub download_url: Option<String>,
}

pub struct CcMixterClient {
    http: reqwest::Client,
    base_url: String,
}

impl CcMixterClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, CCMIXTER_URL)
    }

    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

/// Takes the first upload's download URL. A first entry without one means
/// no usable result.
pub fn pick_download(uploads: &[Upload]) -> Option<String> {
    uploads
        .first()
        .and_then(|u| u.download_url.as_deref())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl SearchProvider for CcMixterClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::CcMixter
    }

    async fn find(&self, query: &ProviderQuery) -> Result<Option<String>, ProviderError> {
        let text = query.text();
        let url = build_url(
            &self.base_url,
            "/api/query",
            &[("f", "json"), ("q", text.as_str()), ("licenses", LICENSES)],
        )?;
        debug!(query = %text, "Searching ccMixter");

        let uploads: Vec<Upload> = get_json(&self.http, url).await?;
        Ok(pick_download(&uploads))
    }
}
