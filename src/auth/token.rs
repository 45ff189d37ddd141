//! Access tokens for the platform and identity provider APIs.
//!
//! A [`TokenSource`] hands out the bearer token used by the remote clients.
//! Static tokens are returned as configured; client-credentials tokens are
//! fetched from the identity provider's token endpoint and cached until shortly
//! before they expire.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::TokenConfig;

/// Refresh cached tokens this long before they actually expire.
const TOKEN_REFRESH_BUFFER_SECS: i64 = 60;

/// A bearer token and its expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Tokens without an expiry never expire.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }

    fn expires_within(&self, buffer: Duration) -> bool {
        self.expires_at.is_some_and(|at| at - buffer <= Utc::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("access token has expired")]
    Expired,

    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Token endpoint response for the client-credentials grant.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

enum Grant {
    Static(AccessToken),
    ClientCredentials {
        http_client: reqwest::Client,
        token_url: String,
        client_id: String,
        client_secret: String,
    },
}

/// Supplies access tokens to the remote clients.
pub struct TokenSource {
    grant: Grant,
    cached: RwLock<Option<AccessToken>>,
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.grant {
            Grant::Static(_) => "static",
            Grant::ClientCredentials { .. } => "client_credentials",
        };
        f.debug_struct("TokenSource").field("type", &kind).finish()
    }
}

impl TokenSource {
    /// A token source that always returns the given token.
    pub fn from_static(token: AccessToken) -> Self {
        Self {
            grant: Grant::Static(token),
            cached: RwLock::new(None),
        }
    }

    /// A token source using the OAuth2 client-credentials grant.
    pub fn client_credentials(
        http_client: reqwest::Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            grant: Grant::ClientCredentials {
                http_client,
                token_url: token_url.into(),
                client_id: client_id.into(),
                client_secret: client_secret.into(),
            },
            cached: RwLock::new(None),
        }
    }

    pub fn from_config(config: &TokenConfig, http_client: &reqwest::Client) -> Self {
        match config {
            TokenConfig::Static { access_token } => {
                Self::from_static(AccessToken::new(access_token.clone(), None))
            }
            TokenConfig::ClientCredentials {
                token_url,
                client_id,
                client_secret,
            } => Self::client_credentials(
                http_client.clone(),
                token_url.clone(),
                client_id.clone(),
                client_secret.clone(),
            ),
        }
    }

    /// Returns a usable token, fetching a new one if the cached token is stale.
    pub async fn token(&self) -> Result<AccessToken, TokenError> {
        let (http_client, token_url, client_id, client_secret) = match &self.grant {
            Grant::Static(token) if token.is_expired() => return Err(TokenError::Expired),
            Grant::Static(token) => return Ok(token.clone()),
            Grant::ClientCredentials {
                http_client,
                token_url,
                client_id,
                client_secret,
            } => (http_client, token_url, client_id, client_secret),
        };

        let buffer = Duration::seconds(TOKEN_REFRESH_BUFFER_SECS);

        {
            let cache = self.cached.read().await;
            if let Some(ref cached) = *cache
                && !cached.expires_within(buffer)
            {
                return Ok(cached.clone());
            }
        }

        let mut cache = self.cached.write().await;

        // Another task may have refreshed while we waited for the write lock
        if let Some(ref cached) = *cache
            && !cached.expires_within(buffer)
        {
            return Ok(cached.clone());
        }

        let response = http_client
            .post(token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TokenError::Status { status, body });
        }

        let body: TokenResponse = response.json().await?;
        // Lifetimes chrono cannot represent are treated as non-expiring
        let expires_at = body
            .expires_in
            .and_then(|secs| Duration::try_seconds(secs.max(0)))
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));
        let token = AccessToken::new(body.access_token, expires_at);

        tracing::debug!(
            token_url = %token_url,
            expires_in = ?body.expires_in,
            "Acquired client credentials token"
        );

        *cache = Some(token.clone());
        Ok(token)
    }
}
