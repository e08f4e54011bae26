use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};
use facevault_core::{RegistryError, ValidationError};
use serde::Serialize;

/// Machine-readable failure class carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidArgument,
    PayloadTooLarge,
    RequestTimeout,
    NotReady,
    Internal,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            Self::InvalidArgument => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::PayloadTooLarge => "payload_too_large",
            Self::RequestTimeout => "request_timeout",
            Self::NotReady => "not_ready",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    ok: bool,
    code: &'static str,
    message: &'a str,
}

#[derive(Debug)]
pub(crate) struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    pub(crate) fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    pub(crate) fn not_ready(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotReady, message)
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            ok: false,
            code: self.code.as_str(),
            message: &self.message,
        };
        (self.code.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::BlankName => Self::invalid_argument("name is required"),
            other => Self::invalid_argument(other.to_string()),
        }
    }
}

/// Write failures are reported without detail; the cause is logged where the
/// storage readiness flag is cleared.
impl From<RegistryError> for ApiError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::Validation(error) => error.into(),
            RegistryError::Persistence(_) => Self::internal("failed to persist state"),
            RegistryError::LockPoisoned => Self::internal("face registry lock poisoned"),
        }
    }
}

pub(crate) fn map_json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::new(
            ErrorCode::PayloadTooLarge,
            "request body exceeds configured size limit",
        ),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => {
            ApiError::invalid_argument("content-type must be application/json")
        }
        _ => ApiError::invalid_argument("invalid JSON payload"),
    }
}

pub(crate) async fn handle_middleware_error(error: BoxError) -> Response {
    if error.is::<tower::timeout::error::Elapsed>() {
        return ApiError::new(ErrorCode::RequestTimeout, "request timed out").into_response();
    }

    tracing::error!(%error, "middleware error");
    ApiError::internal("internal middleware error").into_response()
}
