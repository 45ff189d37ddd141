use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A platform organization (tenant workspace).
///
/// The serialized field names are consumed by the web client and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Platform-assigned identifier, immutable once created
    pub guid: String,
    /// Link to the organization in the platform's apps manager
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub name: String,
    pub quota_definition_guid: String,
    #[serde(default)]
    pub default_isolation_segment_guid: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Organization {
    /// Attach the apps manager link for this organization.
    pub fn with_apps_url(mut self, apps_url: &str) -> Self {
        self.url = Some(format!(
            "{}/organizations/{}",
            apps_url.trim_end_matches('/'),
            self.guid
        ));
        self
    }
}

/// Input for creating an organization on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateOrganization {
    pub name: String,
    pub quota_definition_guid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_isolation_segment_guid: Option<String>,
}

/// Everything needed to select or create the organization for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningRequest {
    /// Authenticated account name (email, `DOMAIN\user`, or bare username)
    pub account: String,
    /// Prefix for derived organization names
    pub name_prefix: String,
    /// Quota definition applied to new organizations
    pub quota_id: String,
    /// Isolation segment applied to new organizations
    pub isolation_segment_id: Option<String>,
}

impl ProvisioningRequest {
    /// The organization name this request targets.
    pub fn target_name(&self) -> String {
        organization_name(&self.name_prefix, &self.account)
    }

    pub fn to_create(&self) -> CreateOrganization {
        CreateOrganization {
            name: self.target_name(),
            quota_definition_guid: self.quota_id.clone(),
            default_isolation_segment_guid: self.isolation_segment_id.clone(),
        }
    }
}

/// Derive the canonical organization name for an account.
///
/// The local part of the account is used: the text before `@` for email
/// addresses, the text after `\` for domain accounts, or the whole account
/// otherwise. Both halves are lower-cased and joined with `-`.
pub fn organization_name(prefix: &str, account: &str) -> String {
    let local = if let Some((user, _)) = account.split_once('@') {
        user
    } else if let Some((_, user)) = account.split_once('\\') {
        user
    } else {
        account
    };

    format!("{}-{}", prefix.to_lowercase(), local.to_lowercase())
}
