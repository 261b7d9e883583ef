//! On-disk state shared between `login`, `callback` and `run`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AppError, ErrorCode, Result};

const VERIFIER_FILE: &str = "code_verifier";
const TOKEN_FILE: &str = "access_token";

/// Stores the PKCE verifier and the access token as plain files.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_verifier(&self, verifier: &str) -> Result<()> {
        self.write(VERIFIER_FILE, verifier)
    }

    pub fn load_verifier(&self) -> Result<Option<String>> {
        self.read(VERIFIER_FILE)
    }

    pub fn save_token(&self, token: &str) -> Result<()> {
        self.write(TOKEN_FILE, token)
    }

    pub fn load_token(&self) -> Result<Option<String>> {
        self.read(TOKEN_FILE)
    }

    /// Returns the stored token or AUTH_REQUIRED.
    pub fn require_token(&self) -> Result<String> {
        self.load_token()?.ok_or_else(AppError::auth_required)
    }

    fn write(&self, name: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| self.io_error(&self.dir, e))?;
        let path = self.dir.join(name);
        fs::write(&path, value).map_err(|e| self.io_error(&path, e))?;
        debug!(path = %path.display(), "Stored auth state");
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Option<String>> {
        let path = self.dir.join(name);
        match fs::read_to_string(&path) {
            Ok(value) => {
                let value = value.trim();
                Ok((!value.is_empty()).then(|| value.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(&path, e)),
        }
    }

    fn io_error(&self, path: &Path, e: io::Error) -> AppError {
        AppError::with_source(
            ErrorCode::InvalidConfig,
            format!("Cannot access state at {}", path.display()),
            e,
        )
    }
}
