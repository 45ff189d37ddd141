mod organizations;
mod users;

use std::sync::Arc;

pub use organizations::{OrganizationResolver, ProvisioningError};
pub use users::UserProvisioner;

use crate::{identity::IdentityProvider, platform::PlatformClient};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub organizations: OrganizationResolver,
    /// Present when an identity provider is configured
    pub users: Option<UserProvisioner>,
}

impl Services {
    pub fn new(platform: Arc<dyn PlatformClient>) -> Self {
        Self {
            organizations: OrganizationResolver::new(platform),
            users: None,
        }
    }

    /// Provision missing users in the given identity provider.
    pub fn with_identity_provider(
        mut self,
        identity: Arc<dyn IdentityProvider>,
        origin: impl Into<String>,
    ) -> Self {
        self.users = Some(UserProvisioner::new(identity, origin));
        self
    }
}
