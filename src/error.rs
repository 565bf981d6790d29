// src/error.rs
//! Application error types with structured error handling.
//!
//! Error types form the vocabulary for failure modes in the system.
//! Markdown parsing and rendering never fail; everything here comes from
//! talking to the Notion API or from rejecting a request before it is sent.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Notion API error codes as a typed vocabulary.
///
/// Instead of matching against magic strings like `"rate_limited"`,
/// the domain vocabulary is encoded in the type system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    /// API rate limit exceeded; back off and retry
    RateLimited,
    /// The requested object does not exist or is inaccessible
    ObjectNotFound,
    /// API key is invalid or expired
    Unauthorized,
    /// API key lacks permission for this resource
    RestrictedResource,
    /// Request body contains invalid JSON
    InvalidJson,
    /// Request parameters failed Notion's validation
    ValidationFailed,
    /// Conflict with current state of the resource
    Conflict,
    /// Notion internal server error
    InternalError,
    /// Notion is temporarily unavailable
    ServiceUnavailable,
    /// An upstream gateway timed out
    GatewayTimeout,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    /// An error code this client doesn't recognize yet
    Unknown(String),
}

impl NotionErrorCode {
    /// Parse a Notion API error code string into the typed vocabulary.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "rate_limited" => Self::RateLimited,
            "object_not_found" => Self::ObjectNotFound,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "invalid_json" => Self::InvalidJson,
            "validation_error" => Self::ValidationFailed,
            "conflict_error" => Self::Conflict,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            "gateway_timeout" => Self::GatewayTimeout,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Create from an HTTP status code when the error body is unparseable.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            500 => Self::InternalError,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            other => Self::HttpStatus(other),
        }
    }

    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited
                | Self::ServiceUnavailable
                | Self::InternalError
                | Self::GatewayTimeout
                | Self::Conflict
                | Self::HttpStatus(502)
        )
    }

    /// Whether this error means the resource simply doesn't exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound)
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ObjectNotFound => write!(f, "object_not_found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RestrictedResource => write!(f, "restricted_resource"),
            Self::InvalidJson => write!(f, "invalid_json"),
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::Conflict => write!(f, "conflict_error"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::GatewayTimeout => write!(f, "gateway_timeout"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// A request the Notion API would reject, caught before any network call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Property '{property}' has computed type '{property_type}' and cannot be written")]
    ComputedProperty {
        property: String,
        property_type: String,
    },

    #[error("Property '{property}' has unsupported type '{property_type}'")]
    UnsupportedPropertyType {
        property: String,
        property_type: String,
    },

    #[error("Block type '{block_type}' cannot be created through the API")]
    UnsupportedBlock { block_type: String },

    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Notion API returned an error ({code}, HTTP {status}): {message}")]
    NotionService {
        code: NotionErrorCode,
        message: String,
        status: u16,
        request_id: Option<String>,
        /// Delay the server asked for before retrying, when it sent one.
        retry_after: Option<Duration>,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Request gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<AppError>,
    },

    #[error("Schema violation: {0}")]
    Schema(#[from] SchemaError),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Maximum recursion depth ({0}) exceeded")]
    RecursionLimitExceeded(usize),

    #[error(transparent)]
    Validation(#[from] crate::types::ValidationError),
}

impl AppError {
    /// Whether the retry layer should try this request again.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NotionService { code, .. } => code.is_retryable(),
            AppError::NetworkFailure(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// The server-supplied retry delay, if this is a rate-limit response that carried one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            AppError::NotionService { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// The structured API error at the root of this failure, if any.
    pub fn notion_code(&self) -> Option<&NotionErrorCode> {
        match self {
            AppError::NotionService { code, .. } => Some(code),
            AppError::RetriesExhausted { last, .. } => last.notion_code(),
            _ => None,
        }
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    fn service_error(code: NotionErrorCode, status: u16) -> AppError {
        AppError::NotionService {
            code,
            message: "boom".to_string(),
            status,
            request_id: None,
            retry_after: None,
        }
    }

    #[test]
    fn test_error_code_vocabulary() {
        assert_eq!(
            NotionErrorCode::from_api_response("rate_limited"),
            NotionErrorCode::RateLimited
        );
        assert_eq!(
            NotionErrorCode::from_api_response("brand_new_code"),
            NotionErrorCode::Unknown("brand_new_code".to_string())
        );
        assert_eq!(NotionErrorCode::RateLimited.to_string(), "rate_limited");
    }

    #[test]
    fn test_http_status_fallback() {
        assert_eq!(
            NotionErrorCode::from_http_status(429),
            NotionErrorCode::RateLimited
        );
        assert!(NotionErrorCode::from_http_status(502).is_retryable());
        assert!(!NotionErrorCode::from_http_status(404).is_retryable());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(service_error(NotionErrorCode::RateLimited, 429).is_retryable());
        assert!(service_error(NotionErrorCode::ServiceUnavailable, 503).is_retryable());
        assert!(!service_error(NotionErrorCode::ValidationFailed, 400).is_retryable());
        assert!(!service_error(NotionErrorCode::ObjectNotFound, 404).is_retryable());
        assert!(!AppError::MalformedResponse("x".to_string()).is_retryable());
    }

    #[test]
    fn test_exhausted_error_exposes_root_code() {
        let err = AppError::RetriesExhausted {
            attempts: 3,
            last: Box::new(service_error(NotionErrorCode::InternalError, 500)),
        };
        assert_eq!(err.notion_code(), Some(&NotionErrorCode::InternalError));
        assert!(err.to_string().contains("3 attempts"));
    }

    #[test]
    fn test_schema_error_names_field() {
        let err = SchemaError::ComputedProperty {
            property: "Total".to_string(),
            property_type: "formula".to_string(),
        };
        assert!(err.to_string().contains("Total"));
        assert!(err.to_string().contains("formula"));
    }
}
