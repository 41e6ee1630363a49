use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::app::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "pinterpal")]
#[command(version)]
#[command(about = "Guided-selling chat client for the PinterPal recommendation service", long_about = None)]
pub struct Cli {
    /// Base URL of the recommendation service
    #[arg(long)]
    pub api_base: Option<String>,

    /// Basic-auth user
    #[arg(short, long)]
    pub user: Option<String>,

    /// Basic-auth password
    #[arg(long)]
    pub password: Option<String>,

    /// Product table to search (e.g. wijnen)
    #[arg(short, long)]
    pub table: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Non-interactive: send this as the first free-text turn
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Non-interactive: answer the following question with this chip label (repeatable)
    #[arg(short, long, requires = "prompt")]
    pub answer: Vec<String>,

    /// Output format for non-interactive mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Command-line values as the top configuration layer
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            base_url: self.api_base.clone(),
            username: self.user.clone(),
            password: self.password.clone(),
            table: self.table.clone(),
            timeout_secs: self.timeout,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Fetch and print the opening question for the configured table
    Starter,
    /// Start a chat session (default)
    Chat,
    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text transcript
    Text,
    /// JSON structured output
    Json,
    /// The HTML fragments the web widget would insert
    Html,
}
