//! Error types and the Face++ service error classifier.
//!
//! Every failure returned by the SDK is a [`FaceError`]. Non-200 responses
//! from the service are turned into a [`ServiceError`] by
//! [`ServiceError::classify`], which resolves the HTTP status and the
//! service's `error_message` token into a readable explanation.

use thiserror::Error;

use crate::models::ResponseEnvelope;

/// Errors that can occur when calling the Face++ API.
#[derive(Error, Debug)]
pub enum FaceError {
    /// The HTTP request failed at the transport level (network, DNS, timeout).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-200 status.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The service answered 200 but the body is not the expected JSON.
    #[error("malformed response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// The endpoint URL is invalid.
    #[error("Invalid endpoint URL: {message}")]
    InvalidEndpoint {
        message: String,
        #[source]
        source: url::ParseError,
    },

    /// A required configuration value is missing.
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// A request or credential failed validation before anything was sent.
    #[error("Invalid request: {0}")]
    Builder(String),

    /// Reading a file payload from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FaceError {
    pub(crate) fn invalid_endpoint_with_source(
        message: impl Into<String>,
        source: url::ParseError,
    ) -> Self {
        Self::InvalidEndpoint {
            message: message.into(),
            source,
        }
    }

    /// The HTTP status of a service error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service(err) => Some(err.status),
            _ => None,
        }
    }
}

/// Result type alias for Face++ operations.
pub type FaceResult<T> = std::result::Result<T, FaceError>;

/// Token sent with 403 when too many calls are in flight for one key.
pub const CONCURRENCY_LIMIT_EXCEEDED: &str = "CONCURRENCY_LIMIT_EXCEEDED";

/// Token sent with 400 when alternative arguments were passed together.
pub const COEXISTENCE_ARGUMENTS: &str = "COEXISTENCE_ARGUMENTS";

/// Code prefix of 400 tokens shaped `MISSING_ARGUMENTS:<name>`.
pub const MISSING_ARGUMENTS: &str = "MISSING_ARGUMENTS";

const DENIED_BY_CLIENT: &str = "Denied by Client";
const DENIED_BY_ADMIN: &str = "Denied by Admin";

const PAYLOAD_TOO_LARGE: u16 = 413;

/// Maximum length of a raw body carried inside an error.
const MAX_ERROR_BODY_LEN: usize = 1000;

/// A non-200 response from the Face++ service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("service error {status}{}: {message}", token_suffix(.error_message))]
pub struct ServiceError {
    /// HTTP status code.
    pub status: u16,
    /// Raw `error_message` token returned by the service.
    ///
    /// Empty for 413 (plain-text body). Holds `body parse failure: <body>`
    /// when the body was not the JSON envelope.
    pub error_message: String,
    /// Human-readable explanation resolved from the status and token.
    pub message: String,
}

impl ServiceError {
    /// Build a service error from a response status and its raw body.
    ///
    /// Never fails: an unparseable body still yields an error value with a
    /// resolved message. A 413 body is plain text and is never parsed.
    pub fn classify(status: u16, body: &str) -> Self {
        let error_message = if status == PAYLOAD_TOO_LARGE {
            String::new()
        } else {
            match serde_json::from_str::<ResponseEnvelope>(body) {
                Ok(envelope) => envelope.error_message.unwrap_or_default(),
                Err(_) => {
                    return Self {
                        status,
                        error_message: format!("body parse failure: {}", truncate_body(body)),
                        message: resolve_message(status, ""),
                    };
                }
            }
        };

        let message = resolve_message(status, &error_message);
        Self {
            status,
            error_message,
            message,
        }
    }

    /// Whether calling again later may succeed.
    ///
    /// True for 500 and for 403 concurrency limiting; the SDK itself never retries.
    pub fn is_retriable(&self) -> bool {
        self.status == 500
            || (self.status == 403 && self.error_message == CONCURRENCY_LIMIT_EXCEEDED)
    }
}

fn resolve_message(status: u16, token: &str) -> String {
    match status {
        401 => "api_key and api_secret do not match".into(),
        403 => resolve_forbidden(token),
        400 => resolve_bad_request(token),
        PAYLOAD_TOO_LARGE => "request payload exceeds the 2MB size limit".into(),
        404 => "the requested API endpoint does not exist".into(),
        500 => "internal server error; safe to retry, contact support if it persists".into(),
        _ => "unknown error".into(),
    }
}

fn resolve_forbidden(token: &str) -> String {
    if token == CONCURRENCY_LIMIT_EXCEEDED {
        return "concurrency limit exceeded for this api_key".into();
    }
    match split_token(token) {
        Some((_, DENIED_BY_CLIENT)) => "calls with this api_key were disabled by its owner".into(),
        Some((_, DENIED_BY_ADMIN)) => {
            "calls with this api_key were disabled by an administrator".into()
        }
        Some(_) => "calls with this api_key are suspended due to insufficient balance".into(),
        None => "api_key lacks permission to call this API".into(),
    }
}

fn resolve_bad_request(token: &str) -> String {
    if token == COEXISTENCE_ARGUMENTS {
        return "mutually exclusive arguments were supplied together".into();
    }
    match split_token(token) {
        Some((MISSING_ARGUMENTS, argument)) => format!("missing required argument: {argument}"),
        Some((_, argument)) => format!("argument parse error: {argument}"),
        None => "bad request arguments".into(),
    }
}

fn token_suffix(token: &str) -> String {
    if token.is_empty() {
        String::new()
    } else {
        format!(" ({token})")
    }
}

/// Split a `CODE:Detail` token; anything other than exactly two parts is `None`.
fn split_token(token: &str) -> Option<(&str, &str)> {
    let mut parts = token.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(code), Some(detail), None) => Some((code, detail)),
        _ => None,
    }
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_LEN) {
        Some((cut, _)) => format!("{}... (truncated)", &body[..cut]),
        None => body.to_string(),
    }
}
