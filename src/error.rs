//! Staking gateway error types with HTTP status code mapping.
//!
//! [`StakingError`] is the central error type. Each variant maps to a
//! numeric code, a stable `errorKind` string, and an HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::MathError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "errorKind": "InvalidAmount",
///     "message": "invalid amount: amount rounds to zero base units",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Stable variant name clients can branch on.
    pub error_kind: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// A wallet that never staked is not an error: the ledger returns no
/// account and the engine answers with a zero result.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                   |
/// |-----------|-----------------|-------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request               |
/// | 2000–2999 | Pool state      | 404 Not Found / 409 Conflict  |
/// | 3000–3999 | Server          | 500 / 502 / 503               |
#[derive(Debug, thiserror::Error)]
pub enum StakingError {
    /// Wallet string is not a valid address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Amount is zero, negative, malformed, or rounds to zero base units.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Neither program has a configuration account.
    #[error("staking pool is not initialized")]
    PoolNotInitialized,

    /// A configuration account exists but matches neither layout.
    #[error("version resolution failed: {0}")]
    VersionResolutionFailed(String),

    /// Integer width exceeded. Never clamped.
    #[error("arithmetic overflow in reward accounting")]
    ArithmeticOverflow,

    /// Division by zero reached the fixed-point layer.
    #[error("division by zero in reward accounting")]
    DivisionByZero,

    /// Instruction or transaction construction failed.
    #[error("transaction build failed: {0}")]
    TransactionBuildFailed(String),

    /// Final transaction encoding failed.
    #[error("transaction serialization failed: {0}")]
    SerializationFailed(String),

    /// Ledger RPC unreachable or returned an error.
    #[error("external service error: {0}")]
    ExternalServiceError(String),

    /// Migration snapshot could not be read or parsed.
    #[error("migration snapshot unavailable: {0}")]
    SnapshotUnavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StakingError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidAddress(_) => 1001,
            Self::InvalidAmount(_) => 1002,
            Self::PoolNotInitialized => 2001,
            Self::VersionResolutionFailed(_) => 2002,
            Self::Internal(_) => 3000,
            Self::ArithmeticOverflow => 3001,
            Self::DivisionByZero => 3002,
            Self::TransactionBuildFailed(_) => 3003,
            Self::SerializationFailed(_) => 3004,
            Self::ExternalServiceError(_) => 3005,
            Self::SnapshotUnavailable(_) => 3006,
        }
    }

    /// Returns the stable variant name.
    #[must_use]
    pub const fn error_kind(&self) -> &'static str {
        match self {
            Self::InvalidAddress(_) => "InvalidAddress",
            Self::InvalidAmount(_) => "InvalidAmount",
            Self::PoolNotInitialized => "PoolNotInitialized",
            Self::VersionResolutionFailed(_) => "VersionResolutionFailed",
            Self::ArithmeticOverflow => "ArithmeticOverflow",
            Self::DivisionByZero => "DivisionByZero",
            Self::TransactionBuildFailed(_) => "TransactionBuildFailed",
            Self::SerializationFailed(_) => "SerializationFailed",
            Self::ExternalServiceError(_) => "ExternalServiceError",
            Self::SnapshotUnavailable(_) => "SnapshotUnavailable",
            Self::Internal(_) => "Internal",
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidAddress(_) | Self::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            Self::PoolNotInitialized => StatusCode::NOT_FOUND,
            Self::VersionResolutionFailed(_) => StatusCode::CONFLICT,
            Self::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            Self::SnapshotUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ArithmeticOverflow
            | Self::DivisionByZero
            | Self::TransactionBuildFailed(_)
            | Self::SerializationFailed(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MathError> for StakingError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::ArithmeticOverflow => Self::ArithmeticOverflow,
            MathError::DivisionByZero => Self::DivisionByZero,
        }
    }
}

impl IntoResponse for StakingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.error_kind(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                error_kind: self.error_kind(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
