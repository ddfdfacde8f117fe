use account_identity::IdentityError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use logger_redacted::redact;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error type/code
    pub error_type: String,
    /// Human-readable error message
    pub message: String,
    /// Timestamp when error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Plain `{"message": ...}` body used for informational responses
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Duplicate account")]
    DuplicateAccount,

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Resource not found: {resource_type}")]
    NotFound { resource_type: String },

    #[error("Upstream timeout: {message}")]
    Timeout { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::DuplicateAccount => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::BadRequest { .. } => "bad_request",
            ApiError::DuplicateAccount => "duplicate_account",
            ApiError::Authentication { .. } => "authentication_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Timeout { .. } => "timeout",
            ApiError::Internal { .. } => "internal_error",
        }
    }

    /// Message safe to return to the client
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Validation { message } | ApiError::BadRequest { message } => message.clone(),
            ApiError::DuplicateAccount => "User already exists".to_string(),
            ApiError::Authentication { message } => message.clone(),
            ApiError::NotFound { resource_type } => format!("{} not found", resource_type),
            ApiError::Timeout { .. } => "Request timed out".to_string(),
            // Backend details stay in the logs
            ApiError::Internal { .. } => "Internal server error".to_string(),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidInput(message) => ApiError::validation(message),
            IdentityError::DuplicateEmail => ApiError::DuplicateAccount,
            IdentityError::InvalidCredentials => ApiError::Authentication {
                message: IdentityError::InvalidCredentials.to_string(),
            },
            IdentityError::NotFound => ApiError::not_found("User"),
            IdentityError::Timeout(after) => ApiError::Timeout {
                message: format!("store did not answer within {:?}", after),
            },
            other @ (IdentityError::Store(_)
            | IdentityError::Hashing(_)
            | IdentityError::Signing(_)
            | IdentityError::Configuration(_)) => ApiError::internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        // Log the error with correlation ID
        if status_code.is_server_error() {
            error!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                error = %redact(&self.to_string()),
                "API error occurred"
            );
        } else {
            warn!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                "Request rejected"
            );
        }

        let error_response = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            message: self.public_message(),
            timestamp: chrono::Utc::now(),
        };

        (status_code, Json(error_response)).into_response()
    }
}
