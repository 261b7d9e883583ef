//! Authorization code flow with PKCE against the Spotify accounts service.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::Url;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{AppError, Result};

pub const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Scope needed to list a user's private playlists.
pub const SCOPE: &str = "playlist-read-private";

/// Length of a generated code verifier.
pub const VERIFIER_LEN: usize = 64;

/// Generates a random verifier over `[A-Za-z0-9]`.
pub fn generate_code_verifier(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// S256 challenge: base64url (unpadded) of the verifier's SHA-256.
pub fn code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Builds the URL the user opens to grant access.
pub fn authorize_url(config: &AppConfig, challenge: &str) -> Result<Url> {
    if config.spotify_client_id.is_empty() {
        return Err(AppError::invalid_config(
            "INSTRUMENTIFY_SPOTIFY_CLIENT_ID is not set",
        ));
    }

    Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", config.spotify_client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("scope", SCOPE),
            ("code_challenge_method", "S256"),
            ("code_challenge", challenge),
        ],
    )
    .map_err(|e| AppError::invalid_config(format!("Invalid authorize URL: {}", e)))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchanges an authorization code for an access token.
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &AppConfig,
    code: &str,
    verifier: &str,
) -> Result<String> {
    exchange_code_at(http, TOKEN_URL, config, code, verifier).await
}

pub(crate) async fn exchange_code_at(
    http: &reqwest::Client,
    token_url: &str,
    config: &AppConfig,
    code: &str,
    verifier: &str,
) -> Result<String> {
    debug!(token_url = %token_url, "Exchanging authorization code");

    let form = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("client_id", config.spotify_client_id.as_str()),
        ("code_verifier", verifier),
    ];

    let response = http
        .post(token_url)
        .form(&form)
        .send()
        .await
        .map_err(|e| AppError::auth_failed(format!("Token request failed: {}", e)))?;

    let status = response.status();
    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| AppError::auth_failed(format!("Malformed token response: {}", e)))?;

    let token = token_from_response(status.as_u16(), body)?;
    info!("Access token obtained");
    Ok(token)
}

fn token_from_response(status: u16, body: TokenResponse) -> Result<String> {
    if let Some(token) = body.access_token.filter(|t| !t.is_empty()) {
        return Ok(token);
    }

    let reason = match (body.error, body.error_description) {
        (Some(error), Some(description)) => format!("{}: {}", error, description),
        (Some(error), None) => error,
        _ => format!("HTTP {} without access_token", status),
    };
    Err(AppError::auth_failed(reason))
}
