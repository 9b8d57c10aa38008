//! search-snapshot
//!
//! Moves the contents of an Azure AI Search index to and from a JSON file.
//!
//! # Usage
//!
//! ```bash
//! # Export every document of an index
//! search-snapshot export --service contoso --index hotels --key $KEY --output hotels.json
//!
//! # Replay the snapshot into another index
//! search-snapshot import --service contoso --index hotels-copy --key $KEY --input hotels.json
//! ```

use search_snapshot::cli::CliInterface;
use search_snapshot::error::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "SEARCH_SNAPSHOT_LOG";

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments
/// 2. Load configuration
/// 3. Initialize logging
/// 4. Run the selected subcommand
///
/// # Returns
/// * `Result<()>` - Success or error
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    cli.run().await
}

/// Initialize logging from the effective configuration
///
/// Logs go to stderr so that command output on stdout stays clean.
/// `SEARCH_SNAPSHOT_LOG` overrides the configured level when set.
///
/// # Arguments
/// * `cli` - CLI interface with the merged configuration
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
