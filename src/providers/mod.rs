//! Search providers for legally downloadable audio.
//!
//! Each provider answers one question: "is there a downloadable recording
//! of (title, artist) in your catalog, and where?" The resolver tries them
//! in priority order:
//! - [`SoundCloudClient`]: public tracks flagged downloadable
//! - [`JamendoClient`]: royalty-free catalog
//! - [`CcMixterClient`]: Creative Commons remixes
//! - [`FmaClient`]: Free Music Archive

pub mod ccmixter;
pub mod credential;
pub mod fma;
pub mod jamendo;
pub mod soundcloud;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use ccmixter::CcMixterClient;
pub use credential::{extract_client_id, CredentialSource};
pub use fma::FmaClient;
pub use jamendo::JamendoClient;
pub use soundcloud::SoundCloudClient;

/// Provider failures. These never leave the resolver; each one means
/// "no candidate from this provider, try the next".
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No client id available for {0}")]
    MissingCredential(ProviderKind),
}

/// Identifies a provider in logs and in the priority list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    SoundCloud,
    Jamendo,
    CcMixter,
    FreeMusicArchive,
}

impl ProviderKind {
    /// Returns the string representation of the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::SoundCloud => "soundcloud",
            ProviderKind::Jamendo => "jamendo",
            ProviderKind::CcMixter => "ccmixter",
            ProviderKind::FreeMusicArchive => "fma",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Free-text search derived from a track. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQuery {
    pub title: String,
    pub artist: String,
}

impl ProviderQuery {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// Returns `"{artist} {title}"`. URL encoding happens when the text is
    /// attached to a provider URL as a query parameter.
    pub fn text(&self) -> String {
        format!("{} {}", self.artist, self.title)
    }
}

/// A catalog that can be searched for a downloadable candidate.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Which provider this is.
    fn kind(&self) -> ProviderKind;

    /// Searches for a candidate.
    ///
    /// Returns `Ok(None)` when the search succeeded but nothing was usable.
    async fn find(&self, query: &ProviderQuery) -> Result<Option<String>, ProviderError>;
}

/// Builds `{base}{path}` with the given query parameters, percent-encoded.
pub(crate) fn build_url(
    base: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<Url, ProviderError> {
    let raw = format!("{}{}", base.trim_end_matches('/'), path);
    Url::parse_with_params(&raw, params)
        .map_err(|e| ProviderError::Parse(format!("invalid URL {}: {}", raw, e)))
}

/// Issues a GET and decodes the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: Url,
) -> Result<T, ProviderError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api(status.as_u16(), error_text));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Parse(e.to_string()))
}
