use std::fmt;

use serde::Deserialize;

/// Structured error information extracted from a search service error body.
///
/// The service reports failures as `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorInfo {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Vec<ErrorDetails>,
}

/// One entry of the optional `details` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorDetails {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorInfo,
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "{code}: {message}")?,
            (None, Some(message)) => write!(f, "{message}")?,
            (Some(code), None) => write!(f, "{code}")?,
            (None, None) => write!(f, "unknown service error")?,
        }
        for detail in &self.details {
            if let Some(message) = &detail.message {
                write!(f, "; {message}")?;
            }
        }
        Ok(())
    }
}

/// Extract structured information from a service error body.
///
/// Returns `None` when the body is not the service's JSON error envelope,
/// e.g. an HTML page from a proxy.
pub fn extract_error_info(body: &str) -> Option<ErrorInfo> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error)
}
