use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{IdentityError, IdentityProvider, IdentityResult};
use crate::{
    auth::{AccessToken, TokenSource},
    models::NewUser,
};

#[derive(Deserialize)]
struct UserList {
    #[serde(default = "Vec::new")]
    resources: Vec<UserResource>,
}

#[derive(Deserialize)]
struct UserResource {
    #[serde(default)]
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserBody<'a> {
    user_name: &'a str,
    origin: &'a str,
    external_id: &'a str,
    emails: [Email<'a>; 1],
}

#[derive(Serialize)]
struct Email<'a> {
    value: &'a str,
    primary: bool,
}

/// Client for the UAA user directory.
///
/// Requests are authenticated with a bearer token from the configured
/// [`TokenSource`]. The client never refreshes tokens itself; a source that
/// cannot supply a valid token fails the call before any request is sent.
#[derive(Debug, Clone)]
pub struct UaaClient {
    url: String,
    http_client: Option<reqwest::Client>,
    tokens: Option<Arc<TokenSource>>,
}

impl UaaClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            http_client: None,
            tokens: None,
        }
    }

    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_token_source(mut self, tokens: Arc<TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    async fn authorize(&self) -> IdentityResult<(&reqwest::Client, AccessToken)> {
        let (Some(http_client), Some(tokens)) = (&self.http_client, &self.tokens) else {
            return Err(IdentityError::Authentication(
                "no HTTP client or token source configured".into(),
            ));
        };
        let token = tokens
            .token()
            .await
            .map_err(|e| IdentityError::Authentication(e.to_string()))?;
        Ok((http_client, token))
    }
}

/// Escape a value for use inside a quoted SCIM filter string.
fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl IdentityProvider for UaaClient {
    #[instrument(name = "uaa.user_id_for_account_name", skip(self))]
    async fn user_id_for_account_name(&self, account: &str) -> IdentityResult<String> {
        if account.is_empty() {
            return Err(IdentityError::Validation(
                "cannot search for a user with an empty account name".into(),
            ));
        }
        let (http_client, token) = self.authorize().await?;

        let filter = format!("userName eq \"{}\"", escape_filter_value(account));
        let response = http_client
            .get(format!("{}/Users", self.url))
            .query(&[("filter", filter.as_str()), ("attributes", "id,userName")])
            .bearer_auth(token.value())
            .send()
            .await
            .map_err(|e| IdentityError::Query(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Query(format!("{status}: {body}")));
        }
        let users: UserList = response
            .json()
            .await
            .map_err(|e| IdentityError::Query(e.to_string()))?;

        let mut resources = users.resources;
        match resources.len() {
            0 => Err(IdentityError::NotFound(account.to_string())),
            1 => Ok(resources.remove(0).id),
            count => {
                tracing::warn!(count, "Account name matches more than one user");
                Err(IdentityError::Ambiguous {
                    account: account.to_string(),
                    count,
                })
            }
        }
    }

    #[instrument(name = "uaa.create_user", skip(self, user), fields(username = %user.username))]
    async fn create_user(&self, user: &NewUser) -> IdentityResult<String> {
        if user.username.is_empty() {
            return Err(IdentityError::Validation(
                "cannot create a user with an empty username".into(),
            ));
        }
        let (http_client, token) = self.authorize().await?;

        let body = CreateUserBody {
            user_name: &user.username,
            origin: &user.origin,
            external_id: &user.external_id,
            emails: [Email {
                value: &user.email,
                primary: true,
            }],
        };
        let response = http_client
            .post(format!("{}/Users", self.url))
            .bearer_auth(token.value())
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Creation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Creation(format!("{status}: {body}")));
        }
        let created: UserResource = response
            .json()
            .await
            .map_err(|e| IdentityError::Creation(e.to_string()))?;
        if created.id.is_empty() {
            return Err(IdentityError::Creation("response carried no user id".into()));
        }

        tracing::info!(user_id = %created.id, "Created user");
        Ok(created.id)
    }
}
