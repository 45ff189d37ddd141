//! Identity provider user directory.
//!
//! [`IdentityProvider`] finds and creates user records; [`UaaClient`]
//! implements it against the UAA `/Users` API.

mod uaa;

use async_trait::async_trait;
use thiserror::Error;
pub use uaa::UaaClient;

use crate::models::NewUser;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Input rejected before any network call
    #[error("{0}")]
    Validation(String),

    #[error("uaa: cannot authenticate: {0}")]
    Authentication(String),

    #[error("uaa: user query failed: {0}")]
    Query(String),

    #[error("cannot find user with account name: [{0}]")]
    NotFound(String),

    #[error("found {count} users with account name: [{account}]")]
    Ambiguous { account: String, count: usize },

    #[error("uaa: cannot create user: {0}")]
    Creation(String),
}

pub type IdentityResult<T> = Result<T, IdentityError>;

/// User operations on the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up the id of the user whose username equals `account`.
    async fn user_id_for_account_name(&self, account: &str) -> IdentityResult<String>;

    /// Create a user and return the id the provider assigned.
    async fn create_user(&self, user: &NewUser) -> IdentityResult<String>;
}
