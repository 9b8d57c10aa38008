//! Command-line interface for search-snapshot
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and merging with arguments
//! - Dispatching the export, import and utility subcommands

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::{Config, LogLevel};
use crate::error::Result;
use crate::export::{self, ExportOptions, QuerySpec};
use crate::import::{self, ImportOptions};
use crate::transport::{IndexTarget, WriteMode};

pub mod completion;

/// Environment variable consulted when `--key` is not given.
pub const API_KEY_ENV: &str = "SEARCH_SNAPSHOT_API_KEY";

/// Export and import Azure AI Search indexes as JSON snapshots
#[derive(Parser, Debug)]
#[command(
    name = "search-snapshot",
    version,
    about = "Export an Azure AI Search index to JSON and import it back",
    long_about = "Drains every document of a search index into a single JSON file, \
and replays such a file into an index in fixed-size batches."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for search-snapshot
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export all documents of an index to a JSON file
    Export(ExportArgs),

    /// Import documents from a JSON file into an index
    Import(ImportArgs),

    /// Show or validate configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Generate shell completion script
    Completion {
        /// Shell type
        #[arg(value_enum, value_name = "SHELL")]
        shell: Shell,
    },

    /// Show version information
    Version,
}

/// Which index to use and how to authenticate
#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    /// Azure Search service name
    #[arg(long, value_name = "NAME")]
    pub service: String,

    /// Index name
    #[arg(long, value_name = "NAME")]
    pub index: String,

    /// API key
    #[arg(long, value_name = "KEY", env = API_KEY_ENV, hide_env_values = true)]
    pub key: String,
}

/// Arguments of the export subcommand
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub index: IndexArgs,

    /// Output JSON file
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,

    /// Fields to include (space separated)
    #[arg(long, value_name = "FIELD", num_args = 1..)]
    pub select: Vec<String>,

    /// Filter expression
    #[arg(long, value_name = "EXPR")]
    pub filter: Option<String>,

    /// Maximum number of documents to export
    #[arg(long, value_name = "N", value_parser = parse_positive)]
    pub top: Option<usize>,

    /// Hide progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments of the import subcommand
#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    #[command(flatten)]
    pub index: IndexArgs,

    /// Input JSON file
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// Batch size for uploads [default: 1000]
    #[arg(long, value_name = "N", value_parser = parse_positive)]
    pub batch_size: Option<usize>,

    /// Merge with existing documents instead of replacing
    #[arg(long)]
    pub merge: bool,

    /// Hide progress bar
    #[arg(long)]
    pub no_progress: bool,
}

fn parse_positive(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl From<&IndexArgs> for IndexTarget {
    fn from(args: &IndexArgs) -> Self {
        IndexTarget {
            service: args.service.clone(),
            index: args.index.clone(),
            api_key: args.key.clone(),
        }
    }
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_logging_args(config, args);

        match &args.command {
            Commands::Export(export_args) => {
                if export_args.no_progress {
                    config.display.progress = false;
                }
            }
            Commands::Import(import_args) => {
                if let Some(batch_size) = import_args.batch_size {
                    config.import.batch_size = batch_size;
                }
                if import_args.merge {
                    config.import.merge = true;
                }
                if import_args.no_progress {
                    config.display.progress = false;
                }
            }
            _ => {}
        }
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Options for the export subcommand
    fn export_options(&self, args: &ExportArgs) -> ExportOptions {
        let mut query = QuerySpec::new().with_select(args.select.clone());
        if let Some(filter) = &args.filter {
            query = query.with_filter(filter.clone());
        }
        if let Some(top) = args.top {
            query = query.with_top(top);
        }

        ExportOptions::new(&args.output, query)
            .with_page_size(self.config.export.page_size)
            .with_progress(self.config.display.progress)
    }

    /// Options for the import subcommand
    fn import_options(&self, args: &ImportArgs) -> ImportOptions {
        ImportOptions::new(&args.input)
            .with_batch_size(self.config.import.batch_size)
            .with_mode(WriteMode::from_merge_flag(self.config.import.merge))
            .with_progress(self.config.display.progress)
    }

    /// Run the selected subcommand
    ///
    /// Export and import never fail here: their errors are reported and the
    /// run counts as zero documents processed.
    ///
    /// # Returns
    /// * `Result<()>` - Success or configuration error
    pub async fn run(&self) -> Result<()> {
        match &self.args.command {
            Commands::Export(args) => {
                self.config.validate()?;
                let target = IndexTarget::from(&args.index);
                export::run_export(&target, &self.config, &self.export_options(args)).await;
                Ok(())
            }
            Commands::Import(args) => {
                self.config.validate()?;
                let target = IndexTarget::from(&args.index);
                import::run_import(&target, &self.config, &self.import_options(args)).await;
                Ok(())
            }
            Commands::Config { show, validate } => self.handle_config_command(*show, *validate),
            Commands::Completion { shell } => {
                completion::generate_completion(*shell, &mut std::io::stdout());
                Ok(())
            }
            Commands::Version => {
                self.show_version();
                Ok(())
            }
        }
    }

    /// Show version information
    fn show_version(&self) {
        println!("search-snapshot version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    ///
    /// With neither flag set the effective configuration is shown.
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file();
        }

        if show || !validate {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("Configuration file does not exist, defaults apply");
            return;
        }

        match Config::from_file(&path) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("Configuration is valid"),
                Err(e) => println!("Configuration validation failed: {}", e),
            },
            Err(e) => println!("Failed to load configuration: {}", e),
        }
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("# Configuration file: {}", path.display());
        println!();
        print!("{}", self.config.to_toml_string()?);
        Ok(())
    }

    /// Get configuration file path (explicit or default)
    pub fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    fn interface(args: &[&str]) -> CliInterface {
        let args = parse(args);
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);
        CliInterface { args, config }
    }

    #[test]
    fn test_export_arguments() {
        let args = parse(&[
            "search-snapshot",
            "export",
            "--service",
            "contoso",
            "--index",
            "hotels",
            "--key",
            "k",
            "--output",
            "out.json",
            "--select",
            "id",
            "name",
            "--filter",
            "rating gt 3",
            "--top",
            "50",
            "--no-progress",
        ]);

        let Commands::Export(export) = &args.command else {
            panic!("expected export command");
        };
        assert_eq!(export.index.service, "contoso");
        assert_eq!(export.select, ["id", "name"]);
        assert_eq!(export.filter.as_deref(), Some("rating gt 3"));
        assert_eq!(export.top, Some(50));
        assert!(export.no_progress);
    }

    #[test]
    fn test_export_options_follow_config() {
        let cli = interface(&[
            "search-snapshot",
            "export",
            "--service",
            "s",
            "--index",
            "i",
            "--key",
            "k",
            "--output",
            "out.json",
            "--no-progress",
        ]);
        let Commands::Export(args) = &cli.args.command else {
            panic!("expected export command");
        };

        let options = cli.export_options(args);
        assert_eq!(options.page_size, 1000);
        assert!(!options.show_progress);
        assert_eq!(options.query, QuerySpec::new());
    }

    #[test]
    fn test_import_defaults_and_overrides() {
        let cli = interface(&[
            "search-snapshot",
            "import",
            "--service",
            "s",
            "--index",
            "i",
            "--key",
            "k",
            "--input",
            "in.json",
        ]);
        let Commands::Import(args) = &cli.args.command else {
            panic!("expected import command");
        };
        let options = cli.import_options(args);
        assert_eq!(options.batch_size, 1000);
        assert_eq!(options.mode, WriteMode::Replace);
        assert!(options.show_progress);

        let cli = interface(&[
            "search-snapshot",
            "import",
            "--service",
            "s",
            "--index",
            "i",
            "--key",
            "k",
            "--input",
            "in.json",
            "--batch-size",
            "250",
            "--merge",
            "-v",
        ]);
        let Commands::Import(args) = &cli.args.command else {
            panic!("expected import command");
        };
        let options = cli.import_options(args);
        assert_eq!(options.batch_size, 250);
        assert_eq!(options.mode, WriteMode::Merge);
        assert_eq!(cli.config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let result = CliArgs::try_parse_from([
            "search-snapshot",
            "import",
            "--service",
            "s",
            "--index",
            "i",
            "--key",
            "k",
            "--input",
            "in.json",
            "--batch-size",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_required_arguments() {
        let result = CliArgs::try_parse_from(["search-snapshot", "export", "--service", "s"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_lowers_log_level() {
        let cli = interface(&["search-snapshot", "-q", "version"]);
        assert_eq!(cli.config.logging.level, LogLevel::Error);
    }
}
