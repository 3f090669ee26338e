//! Bearer tokens for write and delete requests.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// Hands out the current bearer token. `None` means the request goes out
/// anonymously.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<Option<String>>;
}

/// A token fixed at construction time.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.0.clone())
    }
}

/// Reads the token from an environment variable on every request, so an
/// external refresher can rotate it.
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl AccessTokenProvider for EnvToken {
    async fn access_token(&self) -> Result<Option<String>> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            Ok(_) | Err(std::env::VarError::NotPresent) => {
                debug!("No access token in {}", self.var);
                Ok(None)
            }
            Err(e) => Err(anyhow::anyhow!("Invalid access token in {}: {}", self.var, e)),
        }
    }
}
