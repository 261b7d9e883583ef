//! Source resolution across providers.
//!
//! Providers are tried strictly in priority order. The first one that
//! returns a usable candidate ends the search; a failing or empty provider
//! just passes the search on to the next one. Running out of providers is
//! a normal outcome, not an error.

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::providers::credential::SOUNDCLOUD_HOME_URL;
use crate::providers::{
    CcMixterClient, CredentialSource, FmaClient, JamendoClient, ProviderError, ProviderKind,
    ProviderQuery, SearchProvider, SoundCloudClient,
};
use crate::types::{ResolvedSource, Track};

/// Ordered provider list plus the resolution loop.
pub struct SourceResolver {
    providers: Vec<Box<dyn SearchProvider>>,
}

impl SourceResolver {
    /// Creates a resolver over providers given in priority order.
    pub fn new(providers: Vec<Box<dyn SearchProvider>>) -> Self {
        Self { providers }
    }

    /// Creates the default chain: SoundCloud, Jamendo, ccMixter, Free Music Archive.
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> Self {
        let soundcloud_credential = CredentialSource::configured_or_discover(
            config.soundcloud_client_id.clone(),
            SOUNDCLOUD_HOME_URL,
            config.cache_discovered_client_id,
        );
        if config.jamendo_client_id.is_none() {
            warn!("INSTRUMENTIFY_JAMENDO_CLIENT_ID is not set; Jamendo will be skipped");
        }

        Self::new(vec![
            Box::new(SoundCloudClient::new(http.clone(), soundcloud_credential)),
            Box::new(JamendoClient::new(http.clone(), config.jamendo_client_id.clone())),
            Box::new(CcMixterClient::new(http.clone())),
            Box::new(FmaClient::new(http)),
        ])
    }

    /// Returns the providers' kinds in priority order.
    pub fn provider_kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    /// Finds a downloadable source URL for (title, artist).
    ///
    /// Returns None when no provider had a usable candidate.
    pub async fn resolve(&self, title: &str, artist: &str) -> Option<String> {
        let query = ProviderQuery::new(title, artist);

        for provider in &self.providers {
            let kind = provider.kind();
            match provider.find(&query).await {
                Ok(Some(url)) => {
                    info!(provider = %kind, query = %query.text(), url = %url, "Source resolved");
                    return Some(url);
                }
                Ok(None) => {
                    debug!(provider = %kind, query = %query.text(), "No usable candidate");
                }
                Err(ProviderError::MissingCredential(_)) => {
                    debug!(provider = %kind, "Skipping provider without client id");
                }
                Err(e) => {
                    warn!(provider = %kind, query = %query.text(), error = %e, "Provider search failed");
                }
            }
        }

        info!(query = %query.text(), "No legal source found");
        None
    }

    /// Resolves a track into a [`ResolvedSource`].
    pub async fn resolve_track(&self, track: &Track) -> ResolvedSource {
        let source_url = self.resolve(&track.title, &track.artist).await;
        ResolvedSource::new(track.clone(), source_url)
    }
}
