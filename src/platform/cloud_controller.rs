//! Cloud Controller v2 API client.

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::instrument;

use super::{OrgQuery, PlatformClient, PlatformError, PlatformResult};
use crate::{
    auth::{AccessToken, TokenSource},
    models::{CreateOrganization, Organization},
};

/// Paginated list envelope.
#[derive(Deserialize)]
struct ListResponse<T> {
    #[serde(default)]
    next_url: Option<String>,
    #[serde(default = "Vec::new")]
    resources: Vec<T>,
}

#[derive(Deserialize)]
struct OrgResource {
    metadata: Metadata,
    entity: OrgEntity,
}

#[derive(Deserialize)]
struct Metadata {
    guid: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct OrgEntity {
    name: String,
    #[serde(default)]
    quota_definition_guid: String,
    #[serde(default)]
    default_isolation_segment_guid: Option<String>,
}

impl From<OrgResource> for Organization {
    fn from(resource: OrgResource) -> Self {
        Organization {
            guid: resource.metadata.guid,
            url: None,
            name: resource.entity.name,
            quota_definition_guid: resource.entity.quota_definition_guid,
            default_isolation_segment_guid: resource.entity.default_isolation_segment_guid,
            created_at: resource.metadata.created_at,
            updated_at: resource.metadata.updated_at,
        }
    }
}

/// Client for the Cloud Controller v2 organizations API.
#[derive(Debug, Clone)]
pub struct CloudControllerClient {
    api_url: String,
    http_client: Option<reqwest::Client>,
    tokens: Option<Arc<TokenSource>>,
}

impl CloudControllerClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
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

    async fn authorize(&self) -> PlatformResult<(&reqwest::Client, AccessToken)> {
        let (Some(http_client), Some(tokens)) = (&self.http_client, &self.tokens) else {
            return Err(PlatformError::Authentication(
                "no HTTP client or token source configured".into(),
            ));
        };
        let token = tokens
            .token()
            .await
            .map_err(|e| PlatformError::Authentication(e.to_string()))?;
        Ok((http_client, token))
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> PlatformResult<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PlatformError::Status { status, body });
        }
        serde_json::from_str(&body).map_err(|e| PlatformError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PlatformClient for CloudControllerClient {
    #[instrument(name = "platform.list_organizations", skip(self))]
    async fn list_organizations(&self, query: &OrgQuery) -> PlatformResult<Vec<Organization>> {
        let (http_client, token) = self.authorize().await?;

        let mut organizations = Vec::new();
        let first = http_client
            .get(format!("{}/v2/organizations", self.api_url))
            .query(&query.to_params())
            .bearer_auth(token.value())
            .send()
            .await?;
        let mut page: ListResponse<OrgResource> = Self::read_json(first).await?;
        let mut visited = HashSet::new();

        loop {
            organizations.extend(page.resources.into_iter().map(Organization::from));

            let Some(next_url) = page.next_url else { break };
            if !visited.insert(next_url.clone()) {
                return Err(PlatformError::Decode(format!(
                    "organization listing revisits page {next_url}"
                )));
            }
            tracing::debug!(next_url = %next_url, "Fetching next organizations page");

            // next_url is relative to the API root and already carries the query
            let response = http_client
                .get(format!("{}{}", self.api_url, next_url))
                .bearer_auth(token.value())
                .send()
                .await?;
            page = Self::read_json(response).await?;
        }

        tracing::debug!(count = organizations.len(), "Listed organizations");
        Ok(organizations)
    }

    #[instrument(name = "platform.create_organization", skip(self), fields(name = %input.name))]
    async fn create_organization(
        &self,
        input: &CreateOrganization,
    ) -> PlatformResult<Organization> {
        let (http_client, token) = self.authorize().await?;

        let response = http_client
            .post(format!("{}/v2/organizations", self.api_url))
            .bearer_auth(token.value())
            .json(input)
            .send()
            .await?;
        let resource: OrgResource = Self::read_json(response).await?;

        tracing::info!(guid = %resource.metadata.guid, "Created organization");
        Ok(resource.into())
    }
}
