use serde::{Deserialize, Serialize};

/// A user record held by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub account_name: String,
    /// Opaque identifier assigned by the identity provider
    pub user_id: String,
}

/// Input for creating a user in the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    /// Identity provider tag marking which external system manages the account
    pub origin: String,
    /// Identifier linking the record back to the source identity provider
    pub external_id: String,
    pub email: String,
}
