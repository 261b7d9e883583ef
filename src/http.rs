//! HTTP clients.
//!
//! Searches, playlist and token calls are small and share a client with a
//! short total timeout. Source audio and model files come through a second
//! client where the short timeout only bounds connecting; reqwest's total
//! timeout also covers reading the body, so a large transfer needs its own
//! much longer bound.

use reqwest::{Client, ClientBuilder};

use crate::config::AppConfig;
use crate::error::{AppError, ErrorCode, Result};

const USER_AGENT: &str = concat!("instrumentify/", env!("CARGO_PKG_VERSION"));

/// The two clients used by a session.
#[derive(Debug, Clone)]
pub struct HttpClients {
    /// Provider searches, playlist listing, token exchange.
    pub api: Client,
    /// Source audio and model downloads.
    pub transfer: Client,
}

impl HttpClients {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let api = builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(build_error)?;

        let transfer = builder()
            .connect_timeout(config.http_timeout())
            .timeout(config.transfer_timeout())
            .build()
            .map_err(build_error)?;

        Ok(Self { api, transfer })
    }
}

fn builder() -> ClientBuilder {
    Client::builder().user_agent(USER_AGENT)
}

fn build_error(e: reqwest::Error) -> AppError {
    AppError::with_source(ErrorCode::InvalidConfig, "Failed to build HTTP client", e)
}
