use axum::{Json, extract::State};
use http::HeaderMap;

use super::ApiError;
use crate::{
    AppState,
    auth::principal_from_headers,
    models::{Organization, ProvisioningRequest},
    platform::OrgQuery,
};

/// Return the caller's organization, creating it on first visit.
///
/// The caller is identified by the reverse proxy's identity headers. When the
/// proxy does not supply the platform user id, it is looked up (or created) in
/// the identity provider. Every failure answers 404.
#[tracing::instrument(
    name = "api.get_organization",
    skip_all,
    fields(account = tracing::field::Empty)
)]
pub async fn get_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Organization>, ApiError> {
    let principal =
        principal_from_headers(&headers, &state.config.auth).ok_or(ApiError::MissingIdentity)?;
    tracing::Span::current().record("account", principal.account_name.as_str());

    let user_id = match (principal.user_id, &state.services.users) {
        (Some(user_id), _) => user_id,
        (None, Some(users)) => {
            users
                .ensure_user(&principal.account_name, principal.email.as_deref())
                .await?
                .user_id
        }
        (None, None) => return Err(ApiError::MissingUserId),
    };

    let settings = &state.config.organization;
    let request = ProvisioningRequest {
        account: principal.account_name,
        name_prefix: settings.name_prefix.clone(),
        quota_id: settings.quota_id.clone(),
        isolation_segment_id: settings.isolation_segment_id.clone(),
    };

    let org = state
        .services
        .organizations
        .resolve(&request, &OrgQuery::for_user(user_id))
        .await?;

    let org = match &state.config.platform.apps_url {
        Some(apps_url) => org.with_apps_url(apps_url),
        None => org,
    };
    Ok(Json(org))
}
