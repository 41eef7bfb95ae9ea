use crate::envelope::DEFAULT_BASE_URL;
use crate::{Error, Result};
use serde_derive::*;
use std::fmt;

/// environment variable holding the API token
pub const TOKEN_ENV: &str = "TUSHARE_TOKEN";
/// environment variable overriding the API url
pub const BASE_URL_ENV: &str = "TUSHARE_BASE_URL";

/// ClientConfig
///
/// token is required, base_url falls back to the production url
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ClientConfig {
    pub fn new<S: Into<String>>(token: S) -> Self {
        ClientConfig {
            token: token.into(),
            base_url: None,
        }
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// read `TUSHARE_TOKEN` and optional `TUSHARE_BASE_URL`
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(TOKEN_ENV)
            .map_err(|_| Error::Client(format!("environment variable {} not set", TOKEN_ENV)))?;
        let base_url = std::env::var(BASE_URL_ENV).ok().filter(|s| !s.is_empty());
        Ok(ClientConfig { token, base_url })
    }

    pub fn resolved_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"[REDACTED]")
            .field("base_url", &self.resolved_base_url())
            .finish()
    }
}
