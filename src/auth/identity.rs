use http::HeaderMap;

use crate::config::AuthConfig;

/// The authenticated caller, as asserted by the fronting reverse proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Account name (email address, `DOMAIN\user`, or bare username)
    pub account_name: String,

    /// Platform user id, when the proxy already knows it
    pub user_id: Option<String>,

    /// Email address, when the proxy provides one
    pub email: Option<String>,
}

/// Extract the caller from the configured identity headers.
///
/// Returns `None` when the identity header is missing, empty, or not valid
/// UTF-8. Optional headers with unusable values are treated as absent.
pub fn principal_from_headers(headers: &HeaderMap, config: &AuthConfig) -> Option<Principal> {
    let account_name = header_value(headers, &config.identity_header)?;

    let user_id = config
        .user_id_header
        .as_deref()
        .and_then(|h| header_value(headers, h));

    let email = config
        .email_header
        .as_deref()
        .and_then(|h| header_value(headers, h));

    Some(Principal {
        account_name,
        user_id,
        email,
    })
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
