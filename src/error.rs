//! Facade error types.

use serde::Serialize;
use thiserror::Error;

use crate::model::EntityKind;

/// Failures a facade operation can settle with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Injected failure standing in for a transport error.
    #[error("Simulated API Error: {message}")]
    SimulatedFailure { message: String },

    /// No record with the requested id.
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: u64 },

    /// The draft or patch was rejected before touching the store.
    #[error("invalid {entity}: {message}")]
    InvalidInput { entity: EntityKind, message: String },

    /// The caller cancelled the operation before it settled.
    #[error("{operation} cancelled")]
    Cancelled { operation: String },
}

/// Result type for facade operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// JSON error body: `{ message, code, details? }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn simulated(message: impl Into<String>) -> Self {
        ApiError::SimulatedFailure {
            message: message.into(),
        }
    }

    /// HTTP status analog reported in error events.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::SimulatedFailure { .. } => 500,
            ApiError::NotFound { .. } => 404,
            ApiError::InvalidInput { .. } => 400,
            ApiError::Cancelled { .. } => 499,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::SimulatedFailure { .. } => "SIMULATED_FAILURE",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::InvalidInput { .. } => "INVALID_INPUT",
            ApiError::Cancelled { .. } => "CANCELLED",
        }
    }

    pub fn body(&self) -> ErrorBody {
        let details = match self {
            ApiError::NotFound { entity, id } => {
                Some(serde_json::json!({ "entity": entity, "id": id }))
            }
            _ => None,
        };
        ErrorBody {
            message: self.to_string(),
            code: self.code(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::simulated("Something went wrong!");
        assert_eq!(err.to_string(), "Simulated API Error: Something went wrong!");

        let err = ApiError::NotFound {
            entity: EntityKind::User,
            id: 999,
        };
        assert_eq!(err.to_string(), "user 999 not found");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_error_body() {
        let body = ApiError::NotFound {
            entity: EntityKind::Order,
            id: 4,
        }
        .body();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["details"]["entity"], "order");
        assert_eq!(json["details"]["id"], 4);

        let invalid = ApiError::InvalidInput {
            entity: EntityKind::Product,
            message: "price must be a non-negative amount, got -5".into(),
        };
        assert_eq!(invalid.status_code(), 400);
        assert_eq!(invalid.body().code, "INVALID_INPUT");
        assert_eq!(invalid.to_string(), "invalid product: price must be a non-negative amount, got -5");

        let body = ApiError::simulated("boom").body();
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("details").is_none());
    }
}
