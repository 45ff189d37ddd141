//! In-memory [`PlatformClient`] for resolver and route tests.

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use super::{OrgQuery, PlatformClient, PlatformError, PlatformResult};
use crate::models::{CreateOrganization, Organization};

/// Scripted platform: returns a fixed listing and creates organizations
/// with predictable guids, or fails on demand.
#[derive(Default)]
pub(crate) struct FakePlatform {
    organizations: Vec<Organization>,
    fail_list: bool,
    fail_create: bool,
    list_calls: AtomicUsize,
    queries: Mutex<Vec<OrgQuery>>,
    created: Mutex<Vec<CreateOrganization>>,
}

impl FakePlatform {
    pub(crate) fn with_organizations(organizations: Vec<Organization>) -> Self {
        Self {
            organizations,
            ..Self::default()
        }
    }

    pub(crate) fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub(crate) fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> Vec<OrgQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub(crate) fn created(&self) -> Vec<CreateOrganization> {
        self.created.lock().unwrap().clone()
    }
}

/// Organization fixture as the platform would report it.
pub(crate) fn organization(guid: &str, name: &str, quota: &str) -> Organization {
    Organization {
        guid: guid.to_string(),
        url: None,
        name: name.to_string(),
        quota_definition_guid: quota.to_string(),
        default_isolation_segment_guid: None,
        created_at: None,
        updated_at: None,
    }
}

#[async_trait]
impl PlatformClient for FakePlatform {
    async fn list_organizations(&self, query: &OrgQuery) -> PlatformResult<Vec<Organization>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());
        if self.fail_list {
            return Err(PlatformError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "list failed".to_string(),
            });
        }
        Ok(self.organizations.clone())
    }

    async fn create_organization(
        &self,
        input: &CreateOrganization,
    ) -> PlatformResult<Organization> {
        self.created.lock().unwrap().push(input.clone());
        if self.fail_create {
            return Err(PlatformError::Status {
                status: reqwest::StatusCode::BAD_REQUEST,
                body: "create failed".to_string(),
            });
        }
        Ok(Organization {
            guid: format!("created-{}", input.name),
            url: None,
            name: input.name.clone(),
            quota_definition_guid: input.quota_definition_guid.clone(),
            default_isolation_segment_guid: input.default_isolation_segment_guid.clone(),
            created_at: None,
            updated_at: None,
        })
    }
}
