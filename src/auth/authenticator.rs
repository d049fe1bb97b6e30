//! Authenticator implementation
//!
//! Handles applying Amazon Ads authentication to requests and managing
//! access token refresh.

use super::types::{AuthConfig, CachedToken, TokenResponse, CLIENT_ID_HEADER, SCOPE_HEADER};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Source of bearer access tokens
#[async_trait]
pub trait TokenSource: Send + Sync + std::fmt::Debug {
    /// Get a valid access token, refreshing if necessary
    async fn access_token(&self) -> Result<String>;
}

/// A fixed token that never expires
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// OAuth2 refresh-token flow against Login with Amazon
#[derive(Debug)]
pub struct RefreshTokenSource {
    config: AuthConfig,
    /// Cached access token
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl RefreshTokenSource {
    /// Create a token source with a custom HTTP client
    pub fn new(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Fetch a new token using the refresh token
    async fn fetch_new_token(&self) -> Result<CachedToken> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", self.config.refresh_token.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenRefresh {
                message: format!("Refresh token request failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(Error::Http)?;
        debug!(
            expires_in = ?token_response.expires_in,
            "Refreshed Amazon Ads access token"
        );
        Ok(token_response.into_cached_token())
    }
}

#[async_trait]
impl TokenSource for RefreshTokenSource {
    async fn access_token(&self) -> Result<String> {
        // Check if we have a valid cached token
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        // Need to refresh - acquire write lock
        let mut cached = self.cached_token.write().await;

        // Double-check after acquiring write lock (another task might have refreshed)
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.fetch_new_token().await?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }
}

/// Applies Amazon Ads headers and a bearer token to requests
#[derive(Debug, Clone)]
pub struct Authenticator {
    client_id: String,
    profile_id: String,
    tokens: Arc<dyn TokenSource>,
}

impl Authenticator {
    /// Create an authenticator using the refresh-token flow
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator with a custom HTTP client for token requests
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        let client_id = config.client_id.clone();
        let profile_id = config.profile_id.clone();
        Self {
            client_id,
            profile_id,
            tokens: Arc::new(RefreshTokenSource::new(config, http_client)),
        }
    }

    /// Create an authenticator around any token source
    pub fn with_token_source(
        client_id: impl Into<String>,
        profile_id: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            profile_id: profile_id.into(),
            tokens,
        }
    }

    /// Advertiser profile id
    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(req
            .header(CLIENT_ID_HEADER, self.client_id.as_str())
            .header(SCOPE_HEADER, self.profile_id.as_str())
            .bearer_auth(token))
    }
}
