/// Bearer token persisted between CLI invocations.
///
/// The file holds the token response as returned by the login endpoint.
/// A missing file means "logged out".
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, warn};

use crate::models::Token;

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored access token, if any. An unreadable file reads as logged out.
    pub async fn load(&self) -> Option<String> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "session: failed to read token file");
                return None;
            }
        };

        match serde_json::from_slice::<Token>(&bytes) {
            Ok(token) if !token.access_token.is_empty() => Some(token.access_token),
            Ok(_) => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "session: token file is not valid JSON");
                None
            }
        }
    }

    pub async fn save(&self, token: &Token) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let content = serde_json::to_vec_pretty(token)?;
        fs::write(&self.path, &content)
            .await
            .with_context(|| format!("writing {}", self.path.display()))?;
        debug!(path = %self.path.display(), "session: saved");
        Ok(())
    }

    /// Remove the stored token. Clearing an absent session is not an error.
    pub async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}
