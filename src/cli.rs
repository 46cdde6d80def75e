//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::InputMode;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Most texts accepted by one batch request.
pub const MAX_BATCH_SIZE: usize = 10;

/// Sentitrack - sentiment analysis from the terminal
///
/// Sends free text or a Reddit post URL to a sentiment analysis service
/// and prints the classification. Without INPUT, starts an interactive
/// session reading one submission per line.
///
/// Examples:
///   sentitrack "I love this!"
///   sentitrack --mode url https://www.reddit.com/r/rust/comments/abc123/title/
///   sentitrack --batch "great" "awful" "fine I guess"
///   sentitrack --health
///   sentitrack --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Text or post URL to analyze
    ///
    /// Each value is submitted separately, one after the other.
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<String>,

    /// Input mode
    ///
    /// `text` sends free text, `url` sends a Reddit post URL.
    #[arg(long, value_name = "MODE", env = "SENTITRACK_MODE")]
    pub mode: Option<InputMode>,

    /// Analysis service base URL
    ///
    /// Defaults to http://localhost:8000 when neither this flag nor the
    /// config file sets it.
    #[arg(long, value_name = "URL", env = "SENTITRACK_API_URL")]
    pub api_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .sentitrack.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Request timeout in seconds
    ///
    /// No timeout is applied unless set here or in the config file.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum number of comments shown for a post analysis
    #[arg(long, value_name = "COUNT")]
    pub max_comments: Option<usize>,

    /// Check the service health endpoint and exit
    #[arg(long, conflicts_with_all = ["batch", "init_config"])]
    pub health: bool,

    /// Send all inputs in one batch request (text mode, at most 10)
    #[arg(long, requires = "inputs")]
    pub batch: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .sentitrack.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable terminal output (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref api_url) = self.api_url {
            if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.batch {
            if self.mode == Some(InputMode::Url) {
                return Err("--batch only works in text mode".to_string());
            }
            if self.inputs.len() > MAX_BATCH_SIZE {
                return Err(format!(
                    "--batch accepts at most {} inputs, got {}",
                    MAX_BATCH_SIZE,
                    self.inputs.len()
                ));
            }
        }

        Ok(())
    }

    /// Whether to start the interactive session.
    pub fn is_interactive(&self) -> bool {
        self.inputs.is_empty() && !self.health && !self.init_config
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            inputs: vec!["I love this!".to_string()],
            mode: None,
            api_url: None,
            config: None,
            format: None,
            timeout: None,
            max_comments: None,
            health: false,
            batch: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "sentitrack",
            "--mode",
            "url",
            "--api-url",
            "http://127.0.0.1:9000",
            "https://www.reddit.com/r/rust/comments/abc",
        ])
        .unwrap();
        assert_eq!(args.mode, Some(InputMode::Url));
        assert_eq!(args.api_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(args.inputs.len(), 1);
        assert!(!args.is_interactive());
    }

    #[test]
    fn test_validation_invalid_api_url() {
        let mut args = make_args();
        args.api_url = Some("ftp://example.com".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_batch() {
        let mut args = make_args();
        args.batch = true;
        assert!(args.validate().is_ok());

        args.inputs = (0..11).map(|i| format!("text {}", i)).collect();
        assert!(args.validate().is_err());

        args.inputs.truncate(2);
        args.mode = Some(InputMode::Url);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_interactive_without_inputs() {
        let mut args = make_args();
        args.inputs.clear();
        assert!(args.is_interactive());

        args.health = true;
        assert!(!args.is_interactive());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
