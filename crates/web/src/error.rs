use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use storage::error::StorageError;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Storage(StorageError::InvalidTransition(_)) => StatusCode::CONFLICT,
            Self::Storage(StorageError::Timeout(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Storage(StorageError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            Self::Storage(e) if e.is_retryable() => {
                json!({
                    "error": e.to_string(),
                    "retryable": true
                })
            }
            Self::Storage(
                e @ (StorageError::NotFound(_)
                | StorageError::InvalidTransition(_)
                | StorageError::Validation(_)),
            ) => {
                json!({
                    "error": e.to_string()
                })
            }
            Self::Storage(StorageError::Integrity(msg)) => {
                tracing::error!("Run order integrity error: {}", msg);
                json!({
                    "error": format!("Run order generation aborted: {}", msg)
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (StorageError::NotFound("event".into()), StatusCode::NOT_FOUND),
            (StorageError::Conflict("lane".into()), StatusCode::CONFLICT),
            (StorageError::Timeout("lock".into()), StatusCode::SERVICE_UNAVAILABLE),
            (StorageError::Validation("note".into()), StatusCode::BAD_REQUEST),
            (StorageError::InvalidTransition("slot".into()), StatusCode::CONFLICT),
            (StorageError::Integrity("dup".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(WebError::from(error).status_code(), expected);
        }
    }

    #[test]
    fn test_conflict_body_is_marked_retryable() {
        let body = WebError::from(StorageError::Conflict("lane 1 changed concurrently".into())).body();
        assert_eq!(body["retryable"], true);
        assert_eq!(body["error"], "Conflict: lane 1 changed concurrently");
    }

    #[test]
    fn test_not_found_names_the_entity() {
        let body = WebError::from(StorageError::not_found("run slot", "abc")).body();
        assert_eq!(body["error"], "Not found: run slot abc does not exist");
        assert!(body.get("retryable").is_none());
    }
}
