use std::{fmt, io};

use crate::error::remote::ErrorInfo;

/// Crate-wide `Result` type using [`SnapshotError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Top-level error type for snapshot operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum SnapshotError {
    /// Errors raised while talking to the search service.
    Transport(TransportError),

    /// Snapshot file errors (missing, malformed, unwritable).
    Snapshot(SnapshotFileError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// JSON (de)serialization errors.
    Json(serde_json::Error),
}

/// Errors raised by a transport call as a whole.
///
/// These are distinct from per-record rejections, which arrive inside a
/// successful upload response.
#[derive(Debug)]
pub enum TransportError {
    /// Request could not be sent or the response could not be read.
    Request(String),

    /// Service answered with a non-success HTTP status.
    Status {
        status: u16,
        info: Option<ErrorInfo>,
        body: String,
    },

    /// Service answered with a body this client does not understand.
    InvalidResponse(String),

    /// Upload response did not line up with the submitted batch.
    OutcomeMismatch { expected: usize, found: usize },
}

/// Snapshot file errors.
#[derive(Debug)]
pub enum SnapshotFileError {
    /// Snapshot file does not exist.
    NotFound(String),

    /// Parent directory of the output file does not exist.
    MissingDirectory(String),

    /// File is not valid JSON.
    Malformed(String),

    /// Top-level JSON value is not an array.
    NotAnArray(String),

    /// An array element is not a JSON object.
    InvalidRecord { index: usize, found: String },
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Missing required field.
    MissingField(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Transport(e) => write!(f, "Transport error: {e}"),
            SnapshotError::Snapshot(e) => write!(f, "Snapshot error: {e}"),
            SnapshotError::Config(e) => write!(f, "Configuration error: {e}"),
            SnapshotError::Io(e) => write!(f, "I/O error: {e}"),
            SnapshotError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(msg) => write!(f, "Request failed: {msg}"),
            TransportError::Status { status, info, body } => match info {
                Some(info) => write!(f, "HTTP {status}: {info}"),
                None if body.is_empty() => write!(f, "HTTP {status}"),
                None => write!(f, "HTTP {status}: {body}"),
            },
            TransportError::InvalidResponse(msg) => write!(f, "Invalid response: {msg}"),
            TransportError::OutcomeMismatch { expected, found } => write!(
                f,
                "Upload returned {found} results for a batch of {expected} documents"
            ),
        }
    }
}

impl fmt::Display for SnapshotFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotFileError::NotFound(path) => write!(f, "Snapshot file not found: {path}"),
            SnapshotFileError::MissingDirectory(dir) => {
                write!(f, "Directory does not exist: {dir}")
            }
            SnapshotFileError::Malformed(msg) => write!(f, "Malformed snapshot: {msg}"),
            SnapshotFileError::NotAnArray(found) => {
                write!(f, "Snapshot must be a JSON array, found {found}")
            }
            SnapshotFileError::InvalidRecord { index, found } => {
                write!(f, "Snapshot element {index} must be a JSON object, found {found}")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(e) => Some(e),
            SnapshotError::Json(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for TransportError {}
impl std::error::Error for SnapshotFileError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to SnapshotError ========================= */

impl From<io::Error> for SnapshotError {
    fn from(err: io::Error) -> Self {
        SnapshotError::Io(err)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Json(err)
    }
}

impl From<reqwest::Error> for SnapshotError {
    fn from(err: reqwest::Error) -> Self {
        let msg = if err.is_timeout() {
            format!("timed out: {err}")
        } else if err.is_connect() {
            format!("could not connect: {err}")
        } else {
            err.to_string()
        };
        SnapshotError::Transport(TransportError::Request(msg))
    }
}

impl From<TransportError> for SnapshotError {
    fn from(err: TransportError) -> Self {
        SnapshotError::Transport(err)
    }
}

impl From<SnapshotFileError> for SnapshotError {
    fn from(err: SnapshotFileError) -> Self {
        SnapshotError::Snapshot(err)
    }
}

impl From<ConfigError> for SnapshotError {
    fn from(err: ConfigError) -> Self {
        SnapshotError::Config(err)
    }
}

impl From<toml::de::Error> for SnapshotError {
    fn from(err: toml::de::Error) -> Self {
        SnapshotError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_prefers_parsed_info() {
        let err = TransportError::Status {
            status: 403,
            info: Some(ErrorInfo {
                code: Some("Forbidden".to_string()),
                message: Some("Invalid api-key".to_string()),
                details: Vec::new(),
            }),
            body: "{ raw }".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 403: Forbidden: Invalid api-key");
    }

    #[test]
    fn test_status_error_falls_back_to_body() {
        let err = TransportError::Status {
            status: 502,
            info: None,
            body: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_invalid_record_display() {
        let err: SnapshotError = SnapshotFileError::InvalidRecord {
            index: 3,
            found: "string".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Snapshot error: Snapshot element 3 must be a JSON object, found string"
        );
    }
}
