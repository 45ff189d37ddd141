use std::sync::Arc;

use thiserror::Error;

use crate::{
    models::{Organization, ProvisioningRequest},
    platform::{OrgQuery, PlatformClient, PlatformError},
};

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("failed to look up organizations: {0}")]
    Lookup(#[source] PlatformError),

    #[error("failed to create organization: {0}")]
    Creation(#[source] PlatformError),
}

/// Selects the organization an account should land in, creating it when the
/// account has none that fits.
#[derive(Clone)]
pub struct OrganizationResolver {
    platform: Arc<dyn PlatformClient>,
}

impl OrganizationResolver {
    pub fn new(platform: Arc<dyn PlatformClient>) -> Self {
        Self { platform }
    }

    /// Return an existing or newly created organization for the request.
    ///
    /// Among the organizations visible under `scope`, an exact name match wins
    /// over a quota match; with neither, a new organization is created with
    /// the derived name and the requested quota and isolation segment.
    pub async fn resolve(
        &self,
        request: &ProvisioningRequest,
        scope: &OrgQuery,
    ) -> Result<Organization, ProvisioningError> {
        let organizations = self
            .platform
            .list_organizations(scope)
            .await
            .map_err(ProvisioningError::Lookup)?;

        let name = request.target_name();
        if let Some(org) = organizations.iter().find(|org| org.name == name) {
            tracing::debug!(guid = %org.guid, name = %org.name, "Selected organization by name");
            return Ok(org.clone());
        }
        if let Some(org) = organizations
            .iter()
            .find(|org| org.quota_definition_guid == request.quota_id)
        {
            tracing::debug!(guid = %org.guid, name = %org.name, "Selected organization by quota");
            return Ok(org.clone());
        }

        tracing::info!(
            name = %name,
            existing = organizations.len(),
            "No matching organization, creating one"
        );
        self.platform
            .create_organization(&request.to_create())
            .await
            .map_err(ProvisioningError::Creation)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;
    use crate::platform::test::{FakePlatform, organization};

    fn request(prefix: &str, quota: &str) -> ProvisioningRequest {
        ProvisioningRequest {
            account: "testuser@test.com".to_string(),
            name_prefix: prefix.to_string(),
            quota_id: quota.to_string(),
            isolation_segment_id: Some("test-iso-segment-id".to_string()),
        }
    }

    fn user_orgs() -> Vec<Organization> {
        vec![
            organization("test-org-2", "ignition-testuser1", "ignition-quota2-id"),
            organization("test-org-1", "ignition-testuser", "ignition-quota-id"),
        ]
    }

    async fn resolve(
        platform: &Arc<FakePlatform>,
        request: &ProvisioningRequest,
    ) -> Result<Organization, ProvisioningError> {
        OrganizationResolver::new(platform.clone())
            .resolve(request, &OrgQuery::for_user("test-user-id"))
            .await
    }

    #[tokio::test]
    async fn test_name_match_wins_over_quota() {
        let platform = Arc::new(FakePlatform::with_organizations(user_orgs()));

        let org = resolve(&platform, &request("ignition", "ignition-quota2-id"))
            .await
            .unwrap();

        assert_eq!(org.guid, "test-org-1");
        assert!(platform.created().is_empty());
    }

    #[tokio::test]
    async fn test_quota_match_without_name_match() {
        let platform = Arc::new(FakePlatform::with_organizations(user_orgs()));

        let org = resolve(&platform, &request("ignition2", "ignition-quota-id"))
            .await
            .unwrap();

        assert_eq!(org.guid, "test-org-1");
        assert!(platform.created().is_empty());
    }

    #[tokio::test]
    async fn test_first_quota_match_in_platform_order() {
        let platform = Arc::new(FakePlatform::with_organizations(vec![
            organization("first", "other-a", "shared-quota"),
            organization("second", "other-b", "shared-quota"),
        ]));

        let org = resolve(&platform, &request("ignition", "shared-quota"))
            .await
            .unwrap();
        assert_eq!(org.guid, "first");
    }

    #[tokio::test]
    async fn test_creates_when_nothing_matches() {
        let platform = Arc::new(FakePlatform::with_organizations(user_orgs()));

        let org = resolve(&platform, &request("ignition1", "test-quota2-id"))
            .await
            .unwrap();

        assert_eq!(org.name, "ignition1-testuser");
        assert_eq!(org.quota_definition_guid, "test-quota2-id");
        assert_eq!(
            org.default_isolation_segment_guid.as_deref(),
            Some("test-iso-segment-id")
        );
        assert_eq!(platform.created().len(), 1);
    }

    #[tokio::test]
    async fn test_creates_exactly_once_when_user_has_no_orgs() {
        let platform = Arc::new(FakePlatform::default());

        let org = resolve(&platform, &request("ignition", "test-quota-id"))
            .await
            .unwrap();

        assert_eq!(org.name, "ignition-testuser");
        let created = platform.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0], request("ignition", "test-quota-id").to_create());
    }

    #[tokio::test]
    async fn test_scope_is_passed_through() {
        let platform = Arc::new(FakePlatform::with_organizations(user_orgs()));

        resolve(&platform, &request("ignition", "x")).await.unwrap();

        assert_eq!(platform.list_calls(), 1);
        assert_eq!(platform.queries(), vec![OrgQuery::for_user("test-user-id")]);
    }

    #[tokio::test]
    async fn test_lookup_failure() {
        let platform = Arc::new(FakePlatform::default().failing_list());

        let err = resolve(&platform, &request("ignition", "q"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisioningError::Lookup(_)));
        assert!(err.source().is_some());
        assert!(platform.created().is_empty());
    }

    #[tokio::test]
    async fn test_creation_failure() {
        let platform = Arc::new(
            FakePlatform::with_organizations(user_orgs()).failing_create(),
        );

        let err = resolve(&platform, &request("ignition1", "test-quota2-id"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisioningError::Creation(_)));
        assert_eq!(platform.created().len(), 1);
    }
}
