use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{identity::IdentityError, services::ProvisioningError};

/// Standard error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorInfo,
}

/// `{"error": {"type": "...", "message": "...", "code": ...}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn with_type(
        error_type: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorInfo {
                error_type: error_type.into(),
                message: message.into(),
                code: Some(code.into()),
            },
        }
    }
}

/// Failures of the organization endpoint.
///
/// Every variant renders as the same 404 body; the detail is logged only.
#[derive(Debug)]
pub enum ApiError {
    /// No usable identity header on the request
    MissingIdentity,
    /// No user id header and no identity provider to look one up
    MissingUserId,
    Identity(IdentityError),
    Provisioning(ProvisioningError),
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        ApiError::Identity(err)
    }
}

impl From<ProvisioningError> for ApiError {
    fn from(err: ProvisioningError) -> Self {
        ApiError::Provisioning(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::MissingIdentity => {
                tracing::debug!("Request carried no identity")
            }
            ApiError::MissingUserId => {
                tracing::warn!("Request carried no user id and no identity provider is configured")
            }
            ApiError::Identity(err) => tracing::error!(error = %err, "User lookup failed"),
            ApiError::Provisioning(err) => {
                tracing::error!(error = %err, "Organization provisioning failed")
            }
        }

        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::with_type(
                "not_found_error",
                "organization_not_found",
                "Organization not found",
            )),
        )
            .into_response()
    }
}
