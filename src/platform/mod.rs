//! Cloud platform organization API.
//!
//! [`PlatformClient`] is the capability the resolver needs: list the
//! organizations visible to a principal, and create a new one.
//! [`CloudControllerClient`] implements it against the Cloud Controller v2 API.

mod cloud_controller;
#[cfg(test)]
pub(crate) mod test;

use async_trait::async_trait;
pub use cloud_controller::CloudControllerClient;
use thiserror::Error;

use crate::models::{CreateOrganization, Organization};

/// Scope of an organization listing.
///
/// Built by the caller from the session and passed through unchanged; each
/// filter becomes a `q=<name>:<value>` query parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgQuery {
    filters: Vec<(String, String)>,
}

impl OrgQuery {
    /// Organizations the given platform user is a member of.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self::default().filter("user_guid", user_id)
    }

    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((name.into(), value.into()));
        self
    }

    /// Query parameters for the list request.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        self.filters
            .iter()
            .map(|(name, value)| ("q", format!("{name}:{value}")))
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum PlatformError {
    /// No usable client or access token
    #[error("platform: cannot authenticate: {0}")]
    Authentication(String),

    #[error("platform request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("platform returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid platform response: {0}")]
    Decode(String),
}

pub type PlatformResult<T> = Result<T, PlatformError>;

/// Organization operations on the cloud platform.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// List every organization matching the query, in platform order.
    async fn list_organizations(&self, query: &OrgQuery) -> PlatformResult<Vec<Organization>>;

    /// Create an organization and return the platform's record of it.
    async fn create_organization(&self, input: &CreateOrganization)
    -> PlatformResult<Organization>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_query_params() {
        let query = OrgQuery::for_user("user-1").filter("status", "active");
        assert_eq!(
            query.to_params(),
            vec![
                ("q", "user_guid:user-1".to_string()),
                ("q", "status:active".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_query_has_no_params() {
        assert!(OrgQuery::default().to_params().is_empty());
    }
}
