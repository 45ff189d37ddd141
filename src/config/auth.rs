use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Reverse proxy authentication configuration.
///
/// The OAuth2 login itself is handled by an authenticating proxy in front of
/// this service (oauth2-proxy, the platform router's SSO integration, etc.).
/// The proxy forwards the authenticated account in request headers.
///
/// **Security:** only deploy behind a proxy that strips these headers from
/// client requests. Otherwise callers can spoof any identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Header containing the authenticated account name.
    #[serde(default = "default_identity_header")]
    pub identity_header: String,

    /// Header containing the platform user id. When absent from a request,
    /// the user is looked up (and created if needed) in the identity provider.
    #[serde(default = "default_user_id_header")]
    pub user_id_header: Option<String>,

    /// Header containing the user's email address.
    #[serde(default = "default_email_header")]
    pub email_header: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            identity_header: default_identity_header(),
            user_id_header: default_user_id_header(),
            email_header: default_email_header(),
        }
    }
}

impl AuthConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.identity_header.trim().is_empty() {
            return Err(ConfigError::Validation(
                "auth.identity_header cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_identity_header() -> String {
    "X-Forwarded-User".to_string()
}

fn default_user_id_header() -> Option<String> {
    Some("X-Forwarded-User-Id".to_string())
}

fn default_email_header() -> Option<String> {
    Some("X-Forwarded-Email".to_string())
}
