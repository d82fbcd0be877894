use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub type ApiResult<T = Value> = Result<T, ApiError>;

/// Every way a backend call or tool invocation can fail.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Bad or missing input, caught before any network call.
    #[error("{0}")]
    Validation(String),

    #[error("You must be logged in to perform this action.")]
    AuthRequired,

    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// Timeout or connection failure. No status code.
    #[error("{0}")]
    Network(String),

    /// Empty or non-JSON success body.
    #[error("{message}")]
    Protocol {
        message: String,
        details: Option<Value>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    AuthRequired,
    Http,
    Network,
    Protocol,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation(_) => FailureKind::Validation,
            Self::AuthRequired => FailureKind::AuthRequired,
            Self::Http { .. } => FailureKind::Http,
            Self::Network(_) => FailureKind::Network,
            Self::Protocol { .. } => FailureKind::Protocol,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::Http { details, .. } | Self::Protocol { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_error_carries_status_and_details() {
        let err = ApiError::Http {
            status: 404,
            message: "API request failed for fetch_quote_details: 404 Not Found".to_string(),
            details: Some(json!({"message": "not found"})),
        };
        assert_eq!(err.kind(), FailureKind::Http);
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.details(), Some(&json!({"message": "not found"})));
    }

    #[test]
    fn test_network_error_has_no_status() {
        let err = ApiError::Network("Request failed for login: timed out".to_string());
        assert_eq!(err.kind(), FailureKind::Network);
        assert_eq!(err.status_code(), None);
        assert!(err.details().is_none());
    }

    #[test]
    fn test_auth_required_message() {
        assert!(ApiError::AuthRequired.to_string().contains("must be logged in"));
    }
}
