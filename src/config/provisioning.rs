use serde::{Deserialize, Serialize};
use url::Url;

use super::ConfigError;

/// Cloud Controller API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    /// Base URL of the Cloud Controller API (e.g., `https://api.sys.example.com`).
    pub api_url: String,

    /// Base URL of the apps manager UI. When set, organization responses
    /// include a link to the organization.
    #[serde(default)]
    pub apps_url: Option<String>,

    /// Credentials used for platform API calls.
    pub token: TokenConfig,
}

/// Identity provider (UAA) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityProviderConfig {
    /// Base URL of the UAA (e.g., `https://uaa.sys.example.com`).
    pub url: String,

    /// Origin recorded on users created by this service. This names the
    /// external identity provider that manages the account.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Credentials used for user directory calls. Needs the `scim.read`
    /// and `scim.write` scopes.
    pub token: TokenConfig,
}

fn default_origin() -> String {
    "uaa".to_string()
}

/// Where access tokens come from.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenConfig {
    /// A pre-issued token, used as-is and never refreshed.
    Static { access_token: String },

    /// OAuth2 client-credentials grant against the given token endpoint.
    ClientCredentials {
        token_url: String,
        client_id: String,
        client_secret: String,
    },
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenConfig::Static { .. } => f
                .debug_struct("Static")
                .field("access_token", &"****")
                .finish(),
            TokenConfig::ClientCredentials {
                token_url,
                client_id,
                ..
            } => f
                .debug_struct("ClientCredentials")
                .field("token_url", token_url)
                .field("client_id", client_id)
                .field("client_secret", &"****")
                .finish(),
        }
    }
}

impl TokenConfig {
    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        match self {
            TokenConfig::Static { access_token } if access_token.trim().is_empty() => Err(
                ConfigError::Validation(format!("{section}.token.access_token cannot be empty")),
            ),
            TokenConfig::Static { .. } => Ok(()),
            TokenConfig::ClientCredentials {
                token_url,
                client_id,
                ..
            } => {
                validate_url(&format!("{section}.token.token_url"), token_url)?;
                if client_id.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "{section}.token.client_id cannot be empty"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Parameters for organizations created on behalf of users.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizationConfig {
    /// Prefix for derived organization names (`{prefix}-{user}`).
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// Quota definition GUID applied to new organizations.
    pub quota_id: String,

    /// Isolation segment GUID used as the default for new organizations.
    #[serde(default)]
    pub isolation_segment_id: Option<String>,
}

fn default_name_prefix() -> String {
    "ignition".to_string()
}

impl PlatformConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        validate_url("platform.api_url", &self.api_url)?;
        if let Some(apps_url) = &self.apps_url {
            validate_url("platform.apps_url", apps_url)?;
        }
        self.token.validate("platform")
    }
}

impl IdentityProviderConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        validate_url("identity_provider.url", &self.url)?;
        if self.origin.trim().is_empty() {
            return Err(ConfigError::Validation(
                "identity_provider.origin cannot be empty".into(),
            ));
        }
        self.token.validate("identity_provider")
    }
}

impl OrganizationConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.quota_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "organization.quota_id cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::Validation(format!("{field} is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation(format!(
            "{field} must use http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(())
}
