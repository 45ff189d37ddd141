use std::sync::Arc;

use crate::{
    identity::{IdentityError, IdentityProvider},
    models::{NewUser, UserRecord},
};

/// Finds the identity provider record for an account, creating it on first
/// sight.
#[derive(Clone)]
pub struct UserProvisioner {
    identity: Arc<dyn IdentityProvider>,
    origin: String,
}

impl UserProvisioner {
    pub fn new(identity: Arc<dyn IdentityProvider>, origin: impl Into<String>) -> Self {
        Self {
            identity,
            origin: origin.into(),
        }
    }

    /// Look the account up, creating it if the provider has no such user.
    ///
    /// Not atomic: two concurrent first requests for the same account may
    /// both attempt the create.
    pub async fn ensure_user(
        &self,
        account: &str,
        email: Option<&str>,
    ) -> Result<UserRecord, IdentityError> {
        let user_id = match self.identity.user_id_for_account_name(account).await {
            Ok(user_id) => user_id,
            Err(IdentityError::NotFound(_)) => {
                let user = NewUser {
                    username: account.to_string(),
                    origin: self.origin.clone(),
                    external_id: account.to_string(),
                    email: email.unwrap_or(account).to_string(),
                };
                tracing::info!(account = %account, origin = %self.origin, "Creating user");
                self.identity.create_user(&user).await?
            }
            Err(e) => return Err(e),
        };

        Ok(UserRecord {
            account_name: account.to_string(),
            user_id,
        })
    }
}
