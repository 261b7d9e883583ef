//! Client id sources for providers that need one.
//!
//! Order of preference: a configured value, else best-effort discovery from
//! a public page, else the provider is skipped for this search.

use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Public page carrying an embedded SoundCloud web client id.
pub const SOUNDCLOUD_HOME_URL: &str = "https://soundcloud.com/";

const CLIENT_ID_MARKER: &str = "client_id:\"";

/// Where a provider gets its client id from.
#[derive(Debug)]
pub enum CredentialSource {
    /// A client id supplied by configuration.
    Configured(String),

    /// Scrape the id from a public page.
    Discover {
        page_url: String,
        /// Keep the first discovered id for the rest of the session.
        /// When false, every search re-fetches the page.
        cache_for_session: bool,
        cached: Mutex<Option<String>>,
    },

    /// No id and no way to find one; the provider is always skipped.
    Unavailable,
}

impl CredentialSource {
    /// Configured id if present, discovery otherwise.
    pub fn configured_or_discover(
        configured: Option<String>,
        page_url: impl Into<String>,
        cache_for_session: bool,
    ) -> Self {
        match configured {
            Some(id) => CredentialSource::Configured(id),
            None => CredentialSource::Discover {
                page_url: page_url.into(),
                cache_for_session,
                cached: Mutex::new(None),
            },
        }
    }

    /// Configured id if present, otherwise the provider is skipped.
    pub fn configured(configured: Option<String>) -> Self {
        match configured {
            Some(id) => CredentialSource::Configured(id),
            None => CredentialSource::Unavailable,
        }
    }

    /// Returns a client id, or None if this provider should be skipped.
    ///
    /// Discovery failures are logged and never propagated.
    pub async fn client_id(&self, http: &reqwest::Client) -> Option<String> {
        match self {
            CredentialSource::Configured(id) => Some(id.clone()),
            CredentialSource::Unavailable => None,
            CredentialSource::Discover {
                page_url,
                cache_for_session,
                cached,
            } => {
                if *cache_for_session {
                    // Not held across the fetch.
                    if let Some(id) = cached.lock().await.clone() {
                        return Some(id);
                    }
                    let found = discover(http, page_url).await;
                    if let Some(ref id) = found {
                        cached.lock().await.get_or_insert_with(|| id.clone());
                    }
                    found
                } else {
                    discover(http, page_url).await
                }
            }
        }
    }
}

async fn discover(http: &reqwest::Client, page_url: &str) -> Option<String> {
    debug!(url = %page_url, "Discovering client id");

    let page = match http.get(page_url).send().await {
        Ok(response) => response.text().await,
        Err(e) => Err(e),
    };

    match page {
        Ok(text) => {
            let id = extract_client_id(&text);
            if id.is_none() {
                warn!(url = %page_url, "No client id found in page");
            }
            id
        }
        Err(e) => {
            warn!(url = %page_url, error = %e, "Client id discovery failed");
            None
        }
    }
}

/// Extracts the first `client_id:"<word>"` value from page text.
///
/// A word is one or more ASCII letters, digits or underscores, and must be
/// closed by a quote.
pub fn extract_client_id(text: &str) -> Option<String> {
    let mut rest = text;
    while let Some(start) = rest.find(CLIENT_ID_MARKER) {
        let after = &rest[start + CLIENT_ID_MARKER.len()..];
        let word_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());

        if word_len > 0 && after[word_len..].starts_with('"') {
            return Some(after[..word_len].to_string());
        }
        rest = after;
    }
    None
}
