use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// Backend origin, e.g. `http://localhost:8000`. Endpoint paths already
    /// carry the `/api/v1` prefix.
    pub api_base_url: String,
    /// Explicit bearer token. Takes precedence over the stored session.
    pub api_token: Option<String>,
    /// Where `login` persists the access token between invocations.
    pub token_file: PathBuf,
    pub request_timeout_secs: u64,
    /// Rows per page for tables and the dashboard.
    pub page_size: usize,
    /// Quiet period before the dashboard prefetches after a filter change.
    pub prefetch_debounce_ms: u64,
    /// How long a cached query result counts as fresh.
    pub query_stale_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let page_size: usize = optional("PAGE_SIZE", "5")
            .parse()
            .context("PAGE_SIZE must be a positive integer")?;
        ensure!(page_size > 0, "PAGE_SIZE must be greater than zero");

        Ok(Self {
            api_base_url: required("API_BASE_URL")?,
            api_token: std::env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),
            token_file: PathBuf::from(optional("TOKEN_FILE", ".sensor-admin-token")),
            request_timeout_secs: optional("REQUEST_TIMEOUT_SECS", "30")
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a positive integer")?,
            page_size,
            prefetch_debounce_ms: optional("PREFETCH_DEBOUNCE_MS", "300")
                .parse()
                .context("PREFETCH_DEBOUNCE_MS must be a non-negative integer")?,
            query_stale_secs: optional("QUERY_STALE_SECS", "30")
                .parse()
                .context("QUERY_STALE_SECS must be a non-negative integer")?,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn prefetch_debounce(&self) -> Duration {
        Duration::from_millis(self.prefetch_debounce_ms)
    }

    pub fn query_stale_time(&self) -> Duration {
        Duration::from_secs(self.query_stale_secs)
    }
}

/// Parse `"a,b,c"` into a list of equipment ids.
///
/// Entries are trimmed and empty entries are skipped, so `""` yields an
/// empty list and `"a,,b "` yields `["a", "b"]`.
pub fn parse_equipment_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required env var: {key}"))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
