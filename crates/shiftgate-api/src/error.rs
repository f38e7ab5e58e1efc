use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shiftgate_core::error::ShiftgateError;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<String>,
    pub distance: Option<f64>,
    pub allowed_radius: Option<f64>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
            distance: None,
            allowed_radius: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BadRequest", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NotFound", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal", message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_radius: Option<f64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code,
            details: self.details,
            distance: self.distance,
            allowed_radius: self.allowed_radius,
        };
        (self.status, Json(body)).into_response()
    }
}

fn status_for(err: &ShiftgateError) -> StatusCode {
    match err {
        ShiftgateError::GeofenceViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ShiftgateError::ShiftAlreadyActive { .. } | ShiftgateError::NoActiveShift { .. } => {
            StatusCode::CONFLICT
        }
        ShiftgateError::SiteNotConfigured
        | ShiftgateError::SiteNotFound { .. }
        | ShiftgateError::WorkerNotFound { .. } => StatusCode::NOT_FOUND,
        ShiftgateError::SiteSelectionRequired { .. }
        | ShiftgateError::InvalidCoordinate { .. }
        | ShiftgateError::InvalidSite { .. } => StatusCode::BAD_REQUEST,
        ShiftgateError::LocationUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ShiftgateError::PermissionDenied => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ShiftgateError> for ApiError {
    fn from(err: ShiftgateError) -> Self {
        if !err.is_user_facing() {
            tracing::error!(error = %err, code = err.code(), "Request failed with an internal fault");
            return Self::internal("Internal error");
        }

        let mut api_error = Self::new(status_for(&err), err.code(), err.to_string());
        if let ShiftgateError::GeofenceViolation { distance_meters, allowed_radius_meters } = err {
            api_error.distance = Some(distance_meters.round());
            api_error.allowed_radius = Some(allowed_radius_meters);
        }
        api_error
    }
}
