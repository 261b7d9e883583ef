//! Spotify playlist source.

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::types::Track;

pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Extracts a playlist id from a share URL, a `spotify:playlist:` URI or a bare id.
pub fn parse_playlist_id(input: &str) -> Result<String> {
    let input = input.trim();

    let candidate = if let Some((_, rest)) = input.split_once("/playlist/") {
        rest.split(['?', '#', '/']).next().unwrap_or_default()
    } else if let Some(rest) = input.strip_prefix("spotify:playlist:") {
        rest
    } else {
        input
    };

    if candidate.is_empty() || !candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::invalid_playlist_url(input));
    }
    Ok(candidate.to_string())
}

#[derive(Debug, Deserialize)]
struct PlaylistTracksResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    name: Option<String>,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: Option<String>,
}

/// Maps a tracks page to playlist entries.
///
/// Entries with no track (removed or local items) or no credited artist
/// are skipped.
pub fn parse_tracks(body: &str) -> Result<Vec<Track>> {
    let response: PlaylistTracksResponse = serde_json::from_str(body)
        .map_err(|e| AppError::playlist_fetch_failed(format!("Malformed response: {}", e)))?;

    let tracks = response
        .items
        .into_iter()
        .filter_map(|item| {
            let track = item.track?;
            let artist = track.artists.into_iter().next()?.name?;
            Some(Track::new(track.name.unwrap_or_default(), artist))
        })
        .collect();
    Ok(tracks)
}

/// Lists playlist tracks with a bearer token.
pub struct SpotifyPlaylistSource {
    http: reqwest::Client,
    base_url: String,
}

impl SpotifyPlaylistSource {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, SPOTIFY_API_URL)
    }

    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetches the first page of a playlist's tracks.
    pub async fn list_tracks(&self, playlist_id: &str, token: Option<&str>) -> Result<Vec<Track>> {
        let token = token.filter(|t| !t.is_empty()).ok_or_else(AppError::auth_required)?;
        let url = format!(
            "{}/playlists/{}/tracks",
            self.base_url.trim_end_matches('/'),
            playlist_id
        );
        debug!(url = %url, "Fetching playlist");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::playlist_fetch_failed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::auth_failed("Spotify rejected the access token"));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::playlist_fetch_failed(format!("HTTP {}: {}", status, body)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::playlist_fetch_failed(e.to_string()))?;
        let tracks = parse_tracks(&body)?;
        info!(playlist = %playlist_id, tracks = tracks.len(), "Playlist fetched");
        Ok(tracks)
    }
}
