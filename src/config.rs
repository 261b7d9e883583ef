//! Application configuration module.
//!
//! Contains the runtime configuration for instrumentify: identity provider
//! settings, provider credentials, model locations and path configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default HuggingFace location of the low-capacity separation model.
pub const DEFAULT_MODEL_URL_TINY: &str =
    "https://huggingface.co/yourname/instrumentify/resolve/main/htdemucs_tiny.onnx";

/// Default HuggingFace location of the high-capacity separation model.
pub const DEFAULT_MODEL_URL_MEDIUM: &str =
    "https://huggingface.co/yourname/instrumentify/resolve/main/htdemucs_medium.onnx";

/// Default OAuth redirect registered for the Spotify application.
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";

/// Models are hundreds of megabytes; a transfer gets up to an hour.
pub const DEFAULT_TRANSFER_TIMEOUT_SEC: u64 = 3600;

/// Runtime configuration.
///
/// Loaded from environment variables at startup; command-line flags may
/// override individual fields afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Spotify application client id used for the PKCE flow.
    pub spotify_client_id: String,

    /// Redirect URI registered with the Spotify application.
    pub redirect_uri: String,

    /// SoundCloud client id. If None, one is discovered from the public
    /// homepage on each search.
    pub soundcloud_client_id: Option<String>,

    /// Keep a discovered SoundCloud client id for the rest of the session
    /// instead of re-discovering it per search.
    pub cache_discovered_client_id: bool,

    /// Jamendo client id. Jamendo has no discovery fallback, so if None the
    /// provider is skipped and a warning is logged when the resolver is built.
    pub jamendo_client_id: Option<String>,

    /// Location of the low-capacity model.
    pub model_url_tiny: String,

    /// Location of the high-capacity model.
    pub model_url_medium: String,

    /// Directory where downloaded models are stored.
    /// If None, uses the platform-specific default cache location.
    pub model_path: Option<PathBuf>,

    /// Directory where the login verifier and access token are stored.
    /// If None, uses the platform-specific default config location.
    pub state_path: Option<PathBuf>,

    /// Timeout for API requests, in seconds. Also bounds connecting for
    /// bulk transfers.
    pub http_timeout_sec: u64,

    /// Upper bound for a whole source or model transfer, in seconds.
    pub transfer_timeout_sec: u64,

    /// GPU descriptor used by automatic model selection instead of probing.
    pub gpu_descriptor: Option<String>,
}

impl AppConfig {
    /// Creates a new AppConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an AppConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `INSTRUMENTIFY_SPOTIFY_CLIENT_ID` - Spotify application client id
    /// - `INSTRUMENTIFY_REDIRECT_URI` - OAuth redirect URI
    /// - `INSTRUMENTIFY_SOUNDCLOUD_CLIENT_ID` - SoundCloud client id
    /// - `INSTRUMENTIFY_CACHE_CLIENT_ID` - Cache a discovered SoundCloud id (1/true)
    /// - `INSTRUMENTIFY_JAMENDO_CLIENT_ID` - Jamendo client id
    /// - `INSTRUMENTIFY_MODEL_URL_TINY` - Low-capacity model location
    /// - `INSTRUMENTIFY_MODEL_URL_MEDIUM` - High-capacity model location
    /// - `INSTRUMENTIFY_MODEL_PATH` - Model cache directory
    /// - `INSTRUMENTIFY_STATE_PATH` - Token store directory
    /// - `INSTRUMENTIFY_HTTP_TIMEOUT` - API request timeout in seconds
    /// - `INSTRUMENTIFY_TRANSFER_TIMEOUT` - Source/model transfer timeout in seconds
    /// - `INSTRUMENTIFY_GPU` - GPU descriptor override
    ///
    /// Falls back to defaults for unset or invalid variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = non_empty("INSTRUMENTIFY_SPOTIFY_CLIENT_ID") {
            config.spotify_client_id = id;
        }

        if let Some(uri) = non_empty("INSTRUMENTIFY_REDIRECT_URI") {
            config.redirect_uri = uri;
        }

        config.soundcloud_client_id = non_empty("INSTRUMENTIFY_SOUNDCLOUD_CLIENT_ID");
        config.jamendo_client_id = non_empty("INSTRUMENTIFY_JAMENDO_CLIENT_ID");

        if let Some(flag) = non_empty("INSTRUMENTIFY_CACHE_CLIENT_ID") {
            config.cache_discovered_client_id =
                matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Some(url) = non_empty("INSTRUMENTIFY_MODEL_URL_TINY") {
            config.model_url_tiny = url;
        }

        if let Some(url) = non_empty("INSTRUMENTIFY_MODEL_URL_MEDIUM") {
            config.model_url_medium = url;
        }

        if let Some(path) = non_empty("INSTRUMENTIFY_MODEL_PATH") {
            config.model_path = Some(PathBuf::from(path));
        }

        if let Some(path) = non_empty("INSTRUMENTIFY_STATE_PATH") {
            config.state_path = Some(PathBuf::from(path));
        }

        if let Some(timeout_str) = non_empty("INSTRUMENTIFY_HTTP_TIMEOUT") {
            if let Ok(timeout) = timeout_str.parse::<u64>() {
                if timeout > 0 {
                    config.http_timeout_sec = timeout;
                }
            }
        }

        if let Some(timeout_str) = non_empty("INSTRUMENTIFY_TRANSFER_TIMEOUT") {
            if let Ok(timeout) = timeout_str.parse::<u64>() {
                if timeout > 0 {
                    config.transfer_timeout_sec = timeout;
                }
            }
        }

        config.gpu_descriptor = non_empty("INSTRUMENTIFY_GPU");

        config
    }

    /// Returns the HTTP timeout as a Duration.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_sec)
    }

    /// Returns the transfer timeout as a Duration.
    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_sec)
    }

    /// Returns the effective model path, using platform defaults if not specified.
    pub fn effective_model_path(&self) -> PathBuf {
        if let Some(ref path) = self.model_path {
            path.clone()
        } else {
            default_model_path()
        }
    }

    /// Returns the effective state path, using platform defaults if not specified.
    pub fn effective_state_path(&self) -> PathBuf {
        if let Some(ref path) = self.state_path {
            path.clone()
        } else {
            default_state_path()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if self.http_timeout_sec == 0 {
            return Some("http_timeout_sec must be > 0".to_string());
        }

        if self.transfer_timeout_sec == 0 {
            return Some("transfer_timeout_sec must be > 0".to_string());
        }

        if self.model_url_tiny.trim().is_empty() {
            return Some("model_url_tiny must not be empty".to_string());
        }

        if self.model_url_medium.trim().is_empty() {
            return Some("model_url_medium must not be empty".to_string());
        }

        None
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            spotify_client_id: String::new(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            soundcloud_client_id: None,
            cache_discovered_client_id: false,
            jamendo_client_id: None,
            model_url_tiny: DEFAULT_MODEL_URL_TINY.to_string(),
            model_url_medium: DEFAULT_MODEL_URL_MEDIUM.to_string(),
            model_path: None,
            state_path: None,
            http_timeout_sec: 60,
            transfer_timeout_sec: DEFAULT_TRANSFER_TIMEOUT_SEC,
            gpu_descriptor: None,
        }
    }
}

/// Returns the platform-specific default model storage path.
///
/// - macOS: ~/Library/Caches/instrumentify/models
/// - Linux: ~/.cache/instrumentify/models
/// - Windows: C:\Users\<user>\AppData\Local\instrumentify\cache\models
fn default_model_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "instrumentify") {
        proj_dirs.cache_dir().join("models")
    } else {
        PathBuf::from("./models")
    }
}

/// Returns the platform-specific default state path (login verifier, token).
fn default_state_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "instrumentify") {
        proj_dirs.config_dir().to_path_buf()
    } else {
        PathBuf::from("./.instrumentify")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::new();
        assert_eq!(config.model_url_tiny, DEFAULT_MODEL_URL_TINY);
        assert_eq!(config.model_url_medium, DEFAULT_MODEL_URL_MEDIUM);
        assert!(config.soundcloud_client_id.is_none());
        assert!(!config.cache_discovered_client_id);
        assert!(config.validate().is_none());
    }

    #[test]
    fn lookup_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("INSTRUMENTIFY_SOUNDCLOUD_CLIENT_ID", "sc123"),
            ("INSTRUMENTIFY_JAMENDO_CLIENT_ID", "jm456"),
            ("INSTRUMENTIFY_CACHE_CLIENT_ID", "true"),
            ("INSTRUMENTIFY_HTTP_TIMEOUT", "15"),
            ("INSTRUMENTIFY_TRANSFER_TIMEOUT", "600"),
            ("INSTRUMENTIFY_GPU", "NVIDIA GeForce RTX 3060"),
        ]));
        assert_eq!(config.soundcloud_client_id.as_deref(), Some("sc123"));
        assert_eq!(config.jamendo_client_id.as_deref(), Some("jm456"));
        assert!(config.cache_discovered_client_id);
        assert_eq!(config.http_timeout(), Duration::from_secs(15));
        assert_eq!(config.transfer_timeout(), Duration::from_secs(600));
        assert_eq!(config.gpu_descriptor.as_deref(), Some("NVIDIA GeForce RTX 3060"));
    }

    #[test]
    fn invalid_values_ignored() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("INSTRUMENTIFY_HTTP_TIMEOUT", "0"),
            ("INSTRUMENTIFY_SOUNDCLOUD_CLIENT_ID", "   "),
            ("INSTRUMENTIFY_MODEL_URL_TINY", ""),
        ]));
        assert_eq!(config.http_timeout_sec, 60);
        assert!(config.soundcloud_client_id.is_none());
        assert_eq!(config.model_url_tiny, DEFAULT_MODEL_URL_TINY);
    }

    #[test]
    fn config_validation() {
        let mut config = AppConfig::new();
        config.http_timeout_sec = 0;
        assert!(config.validate().is_some());

        config.http_timeout_sec = 30;
        config.transfer_timeout_sec = 0;
        assert!(config.validate().is_some());

        config.transfer_timeout_sec = 60;
        config.model_url_medium = String::new();
        assert!(config.validate().is_some());
    }

    #[test]
    fn effective_paths() {
        let config = AppConfig::new();
        assert!(!config.effective_model_path().as_os_str().is_empty());
        assert!(!config.effective_state_path().as_os_str().is_empty());

        let config = AppConfig {
            model_path: Some(PathBuf::from("/tmp/models")),
            ..AppConfig::default()
        };
        assert_eq!(config.effective_model_path(), PathBuf::from("/tmp/models"));
    }
}
