//! Error handling module for snapshot operations.
//!
//! This module provides error handling for export and import runs with:
//! - Application-specific error kinds (transport, snapshot file, configuration)
//! - Structured error information extracted from search service responses
//!
//! # Example
//!
//! ```rust
//! use search_snapshot::error::{ConfigError, Result, extract_error_info};
//!
//! fn example_operation() -> Result<()> {
//!     Err(ConfigError::MissingField("service.api_version".to_string()).into())
//! }
//!
//! let body = r#"{"error":{"code":"Forbidden","message":"Invalid api-key"}}"#;
//! let info = extract_error_info(body).unwrap();
//! assert_eq!(info.to_string(), "Forbidden: Invalid api-key");
//! assert!(example_operation().is_err());
//! ```

pub mod kinds;
pub mod remote;

// Re-export commonly used types
pub use kinds::{ConfigError, Result, SnapshotError, SnapshotFileError, TransportError};
pub use remote::{ErrorDetails, ErrorInfo, extract_error_info};
