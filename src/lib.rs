//! Azure AI Search snapshot library
//!
//! Exports the documents of a search index into a JSON array file and
//! imports such a file back into an index. The binary is a thin wrapper over
//! [`cli::CliInterface`]; the export and import pipelines can be driven
//! directly through [`export::run_export`] and [`import::run_import`].
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `export`: Paginated export into a snapshot file
//! - `import`: Batched import from a snapshot file
//! - `progress`: Progress reporting
//! - `snapshot`: Snapshot file format
//! - `transport`: Search service access
//!
//! # Example
//!
//! ```no_run
//! use search_snapshot::config::Config;
//! use search_snapshot::import::{ImportOptions, run_import};
//! use search_snapshot::transport::{IndexTarget, WriteMode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let target = IndexTarget {
//!         service: "contoso".to_string(),
//!         index: "hotels".to_string(),
//!         api_key: "<admin key>".to_string(),
//!     };
//!     let options = ImportOptions::new("hotels.json").with_mode(WriteMode::Merge);
//!
//!     let imported = run_import(&target, &Config::default(), &options).await;
//!     println!("Imported {} documents", imported);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod progress;
pub mod snapshot;
pub mod transport;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SnapshotError};
pub use export::{ExportOptions, ExportResult, QuerySpec};
pub use import::{ImportOptions, ImportResult};
pub use snapshot::Record;
pub use transport::{IndexTarget, SearchClient, WriteMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}
