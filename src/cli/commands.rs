use anyhow::{Context, Result};
use colored::Colorize;

use crate::{
    app::{init_config, Config},
    constants::STARTER_PATH,
    sanitize::to_safe_label,
    session::Starter,
    transport::{ApiRequest, HttpTransport, Transport},
};

use super::Commands;

/// Handle CLI subcommands
pub async fn handle_command(command: &Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing PinterPal configuration...");
            for path in init_config()? {
                println!("  Created {}", path.display());
            }
            println!("Configuration initialized successfully!");
            Ok(true)
        }
        Commands::Starter => {
            show_starter(config).await?;
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Chat => Ok(false), // Continue to chat interface
    }
}

/// Fetch the opening question without starting a conversation
pub async fn show_starter(config: &Config) -> Result<()> {
    let transport = HttpTransport::from_config(&config.api)?;
    let request = ApiRequest::get(STARTER_PATH).with_query("table", config.widget.table.clone());

    let value = transport
        .execute(request)
        .await
        .with_context(|| format!("Failed to fetch starter from {}", transport.base_url()))?;
    let starter = Starter::from_value(value)?;

    println!("{}", to_safe_label(&starter.question_text).bold());
    for suggestion in &starter.suggestions {
        println!("  • {}", to_safe_label(suggestion).green());
    }
    Ok(())
}

/// Show version information
pub fn show_version() {
    println!("PinterPal v{}", env!("CARGO_PKG_VERSION"));
    println!("   Guided-selling chat for the PinterPal recommendation service");
}
