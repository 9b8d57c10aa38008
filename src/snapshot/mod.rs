//! Snapshot file reading and writing
//!
//! A snapshot is a single UTF-8 JSON array of objects, pretty-printed with
//! two-space indentation. Each object is one [`Record`] exactly as the search
//! service returned it. Exports write the file once, truncating any previous
//! content; imports read it whole.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::error::{Result, SnapshotError, SnapshotFileError};

/// One document: an ordered map of field name to JSON value.
pub type Record = serde_json::Map<String, Value>;

/// Writer for snapshot files
pub struct SnapshotWriter {
    /// Path to the output file
    path: PathBuf,
}

impl SnapshotWriter {
    /// Create a writer for `path`, checking that its directory exists
    ///
    /// Nothing is written until [`SnapshotWriter::write`] is called.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        validate_path(&path)?;
        Ok(Self { path })
    }

    /// Serialize `records` and replace the file content with them
    ///
    /// # Returns
    /// * `Result<u64>` - Number of bytes written
    pub async fn write(&self, records: &[Record]) -> Result<u64> {
        let bytes = serde_json::to_vec_pretty(records)?;

        let file = File::create(&self.path).await?;
        let mut writer = BufWriter::with_capacity(8 * 1024 * 1024, file); // 8MB buffer
        writer.write_all(&bytes).await?;
        writer.flush().await?;

        debug!(
            "Wrote snapshot {} ({} documents, {} bytes)",
            self.path.display(),
            records.len(),
            bytes.len()
        );
        Ok(bytes.len() as u64)
    }
}

/// Read a snapshot file fully into memory
///
/// The top-level value must be an array and every element an object.
pub async fn read_snapshot(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            SnapshotError::Snapshot(SnapshotFileError::NotFound(path.display().to_string()))
        }
        _ => SnapshotError::Io(e),
    })?;

    let records = parse_snapshot(&bytes)?;
    debug!("Read snapshot {} ({} documents)", path.display(), records.len());
    Ok(records)
}

/// Parse snapshot bytes into records
pub fn parse_snapshot(bytes: &[u8]) -> Result<Vec<Record>> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| SnapshotFileError::Malformed(e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(SnapshotFileError::NotAnArray(json_kind(&value).to_string()).into());
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(SnapshotError::from(SnapshotFileError::InvalidRecord {
                index,
                found: json_kind(&other).to_string(),
            })),
        })
        .collect()
}

/// Check that the parent directory of `path` exists
pub(crate) fn validate_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(SnapshotFileError::MissingDirectory(parent.display().to_string()).into());
        }
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
pub(crate) fn temp_snapshot_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}-{}.json", name, uuid::Uuid::new_v4()))
}
