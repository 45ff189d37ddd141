//! Configuration module for the provisioning service.
//!
//! The service is configured via a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [platform]
//! api_url = "https://api.sys.example.com"
//! apps_url = "https://apps.sys.example.com"
//! token = { type = "client_credentials", token_url = "https://uaa.sys.example.com/oauth/token", client_id = "ignition", client_secret = "${IGNITION_CLIENT_SECRET}" }
//!
//! [organization]
//! name_prefix = "ignition"
//! quota_id = "${IGNITION_QUOTA_ID}"
//! ```

mod auth;
mod observability;
mod provisioning;
mod server;

use std::{path::Path, sync::LazyLock};

pub use auth::*;
pub use observability::*;
pub use provisioning::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
pub use server::*;

static ENV_VAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IgnitionConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Identity header configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Cloud Controller API used to find and create organizations.
    pub platform: PlatformConfig,

    /// UAA used to find and create users. When omitted, requests must carry
    /// the platform user id header.
    #[serde(default)]
    pub identity_provider: Option<IdentityProviderConfig>,

    /// Parameters for organizations created on behalf of users.
    pub organization: OrganizationConfig,

    /// Observability configuration (logging).
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl IgnitionConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing variables cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: IgnitionConfig = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for consistency and completeness.
    fn validate(&self) -> Result<(), ConfigError> {
        self.auth.validate()?;
        self.platform.validate()?;
        if let Some(idp) = &self.identity_provider {
            idp.validate()?;
        }
        self.organization.validate()?;

        if self.identity_provider.is_none() && self.auth.user_id_header.is_none() {
            return Err(ConfigError::Validation(
                "either identity_provider or auth.user_id_header must be configured \
                 to determine the platform user id"
                    .into(),
            ));
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Expand environment variables in the format `${VAR_NAME}`.
/// Variables after a `#` on the same line are left untouched.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');
        let mut last_end = 0;

        for cap in ENV_VAR_REGEX.captures_iter(line) {
            let Some(whole) = cap.get(0) else { continue };

            if let Some(pos) = comment_pos
                && whole.start() >= pos
            {
                continue;
            }

            result.push_str(&line[last_end..whole.start()]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            result.push_str(&value);

            last_end = whole.end();
        }

        result.push_str(&line[last_end..]);
        result.push('\n');
    }

    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const MINIMAL: &str = r#"
        [platform]
        api_url = "https://api.example.net"
        token = { type = "static", access_token = "cf-token" }

        [organization]
        quota_id = "test-quota-id"
    "#;

    #[test]
    fn test_minimal_config() {
        let config = IgnitionConfig::from_str(MINIMAL).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.identity_header, "X-Forwarded-User");
        assert_eq!(
            config.auth.user_id_header.as_deref(),
            Some("X-Forwarded-User-Id")
        );
        assert_eq!(config.organization.name_prefix, "ignition");
        assert_eq!(config.organization.quota_id, "test-quota-id");
        assert_eq!(config.organization.isolation_segment_id, None);
        assert!(config.identity_provider.is_none());
        assert_eq!(config.observability.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_full_config() {
        let config = IgnitionConfig::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [server.http_client]
            timeout_secs = 5

            [auth]
            identity_header = "X-Auth-Request-User"
            email_header = "X-Auth-Request-Email"

            [platform]
            api_url = "https://api.example.net"
            apps_url = "https://apps.example.net"

            [platform.token]
            type = "client_credentials"
            token_url = "https://uaa.example.net/oauth/token"
            client_id = "ignition"
            client_secret = "secret"

            [identity_provider]
            url = "https://uaa.example.net"
            origin = "google"
            token = { type = "static", access_token = "uaa-token" }

            [organization]
            name_prefix = "playground"
            quota_id = "test-quota-id"
            isolation_segment_id = "test-iso-segment-id"

            [observability.logging]
            level = "debug"
            format = "json"
        "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.http_client.timeout_secs, 5);
        assert_eq!(config.auth.identity_header, "X-Auth-Request-User");
        assert!(matches!(
            config.platform.token,
            TokenConfig::ClientCredentials { ref client_id, .. } if client_id == "ignition"
        ));
        let idp = config.identity_provider.unwrap();
        assert_eq!(idp.origin, "google");
        assert_eq!(
            config.organization.isolation_segment_id.as_deref(),
            Some("test-iso-segment-id")
        );
        assert_eq!(config.observability.logging.level, LogLevel::Debug);
        assert_eq!(config.observability.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_missing_platform_section() {
        let result = IgnitionConfig::from_str(
            r#"
            [organization]
            quota_id = "q"
        "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = IgnitionConfig::from_str(&format!("{MINIMAL}\n[extra]\nvalue = 1\n"));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_api_url() {
        let result = IgnitionConfig::from_str(
            r#"
            [platform]
            api_url = "not a url"
            token = { type = "static", access_token = "t" }

            [organization]
            quota_id = "q"
        "#,
        );
        match result {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("platform.api_url")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_quota_rejected() {
        let result = IgnitionConfig::from_str(
            r#"
            [platform]
            api_url = "https://api.example.net"
            token = { type = "static", access_token = "t" }

            [organization]
            quota_id = ""
        "#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_user_id_source_required() {
        let mut config = IgnitionConfig::from_str(MINIMAL).unwrap();
        config.auth.user_id_header = None;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_env_var_expansion() {
        temp_env::with_var("IGNITION_TEST_QUOTA", Some("quota-from-env"), || {
            let config = IgnitionConfig::from_str(
                &MINIMAL.replace("test-quota-id", "${IGNITION_TEST_QUOTA}"),
            )
            .unwrap();
            assert_eq!(config.organization.quota_id, "quota-from-env");
        });
    }

    #[test]
    fn test_missing_env_var() {
        temp_env::with_var_unset("IGNITION_TEST_MISSING", || {
            let result = IgnitionConfig::from_str(
                &MINIMAL.replace("test-quota-id", "${IGNITION_TEST_MISSING}"),
            );
            match result {
                Err(ConfigError::EnvVarNotFound(name)) => {
                    assert_eq!(name, "IGNITION_TEST_MISSING")
                }
                other => panic!("expected missing env var, got {:?}", other),
            }
        });
    }

    #[test]
    fn test_env_var_in_comment_ignored() {
        let input = "# token = \"${DOES_NOT_EXIST_ANYWHERE}\"\nkey = \"value\"";
        assert_eq!(expand_env_vars(input).unwrap(), input);
    }

    #[test]
    fn test_env_var_before_comment_expanded() {
        temp_env::with_var("IGNITION_TEST_BEFORE", Some("expanded"), || {
            let input = "key = \"${IGNITION_TEST_BEFORE}\" # ${NOT_EXPANDED}";
            assert_eq!(
                expand_env_vars(input).unwrap(),
                "key = \"expanded\" # ${NOT_EXPANDED}"
            );
        });
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = IgnitionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.platform.api_url, "https://api.example.net");
    }

    #[test]
    fn test_from_missing_file() {
        let result = IgnitionConfig::from_file("/nonexistent/ignition.toml");
        assert!(matches!(result, Err(ConfigError::Io(_, _))));
    }
}
