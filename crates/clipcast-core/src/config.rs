//! Configuration module
//!
//! Client-side settings for the metadata API, storage transfers and share
//! links, read from the environment.

use std::env;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const HTTP_TIMEOUT_SECS: u64 = 60;
const UPLOAD_CHUNK_BYTES: usize = 256 * 1024;

/// Authentication strategy for the metadata API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub auth: Auth,
    /// Origin used for `<origin>/watch/<shareToken>` links.
    pub share_origin: String,
    /// Timeout for metadata API calls. Storage transfers are not bounded.
    pub http_timeout_secs: u64,
    /// Body chunk size for storage PUTs; one progress event per chunk.
    pub upload_chunk_bytes: usize,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, auth: Auth) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            share_origin: api_url.clone(),
            api_url,
            auth,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            upload_chunk_bytes: UPLOAD_CHUNK_BYTES,
        }
    }

    /// Load from environment: CLIPCAST_API_URL (or API_URL), CLIPCAST_TOKEN for
    /// Bearer auth, otherwise CLIPCAST_API_KEY (or API_KEY) for X-API-Key auth.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = var("CLIPCAST_API_URL")
            .or_else(|| var("API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let auth = match var("CLIPCAST_TOKEN") {
            Some(token) => Auth::Bearer(token),
            None => Auth::XApiKey(
                var("CLIPCAST_API_KEY")
                    .or_else(|| var("API_KEY"))
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "Missing credentials. Set CLIPCAST_TOKEN or CLIPCAST_API_KEY (or API_KEY)"
                        )
                    })?,
            ),
        };

        let config = Self {
            share_origin: var("CLIPCAST_SHARE_ORIGIN")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| api_url.clone()),
            api_url,
            auth,
            http_timeout_secs: var("CLIPCAST_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|| HTTP_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(HTTP_TIMEOUT_SECS),
            upload_chunk_bytes: var("CLIPCAST_UPLOAD_CHUNK_BYTES")
                .unwrap_or_else(|| UPLOAD_CHUNK_BYTES.to_string())
                .parse()
                .unwrap_or(UPLOAD_CHUNK_BYTES),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !is_http_url(&self.api_url) {
            return Err(anyhow::anyhow!(
                "CLIPCAST_API_URL must start with http:// or https://"
            ));
        }

        if !is_http_url(&self.share_origin) {
            return Err(anyhow::anyhow!(
                "CLIPCAST_SHARE_ORIGIN must start with http:// or https://"
            ));
        }

        let credential = match &self.auth {
            Auth::Bearer(token) => token,
            Auth::XApiKey(key) => key,
        };
        if credential.trim().is_empty() {
            return Err(anyhow::anyhow!("API credential must not be empty"));
        }

        if self.http_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "CLIPCAST_HTTP_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if self.upload_chunk_bytes == 0 {
            return Err(anyhow::anyhow!(
                "CLIPCAST_UPLOAD_CHUNK_BYTES must be greater than 0"
            ));
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
