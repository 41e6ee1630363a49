use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;
use tracing::info;

use crate::{
    app::{load_config, Config},
    cli::{handle_command, Cli},
    session::SessionDriver,
    tui::{run_ui, App},
};

use super::NonInteractiveRunner;

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let overrides = cli.overrides();
        let config = if overrides.config_file.is_some() {
            load_config(&overrides)?
        } else {
            match load_config(&overrides) {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("⚠️  Failed to load config: {:#}. Using defaults.", e);
                    Config::default().with_overrides(&overrides)
                }
            }
        };

        Ok(Self { cli, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the orchestrator. Returns false when a non-interactive turn failed.
    pub async fn run(self) -> Result<bool> {
        if let Some(command) = &self.cli.command {
            if handle_command(command, &self.config).await? {
                return Ok(true);
            }
        }

        if let Some(prompt) = self.cli.prompt.clone() {
            return self.run_non_interactive(prompt).await;
        }

        let driver = SessionDriver::from_config(&self.config)
            .context("Failed to set up the HTTP client")?;
        info!(
            "Opening chat for table {} at {}",
            self.config.widget.table, self.config.api.base_url
        );
        println!(
            "🍷 Starting PinterPal for table: {}",
            self.config.widget.table.green()
        );

        let app = App::new(Arc::new(driver), &self.config);
        run_ui(app).await?;
        Ok(true)
    }

    async fn run_non_interactive(&self, prompt: String) -> Result<bool> {
        let runner = NonInteractiveRunner::new(&self.config)?;
        let result = runner.execute(prompt, &self.cli.answer).await;

        println!("{}", runner.format_result(&result, self.cli.output_format));
        Ok(result.errors.is_empty())
    }
}
