// CLI module for operations that need direct database access

pub mod admin;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;

/// Maintrack command line
#[derive(Parser, Debug)]
#[command(name = "maintrack")]
#[command(about = "Equipment maintenance backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Apply pending migrations to both databases and exit
    Migrate,

    /// Create an approved administrator and print its generated password once
    CreateAdmin {
        /// Display name
        #[arg(long)]
        name: String,

        /// Login email
        #[arg(long)]
        email: String,
    },
}

impl Cli {
    /// True when the server should be started
    pub fn serves(&self) -> bool {
        matches!(self.command, None | Some(Commands::Serve))
    }
}

/// Execute a one-shot CLI command
///
/// Migrations already ran while building `AppData`, so `Migrate` only reports.
///
/// # Returns
/// * `Ok(())` - Command executed successfully
/// * `Err(...)` - Command execution failed
pub async fn execute_command(
    command: Commands,
    app_data: Arc<AppData>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve => {}
        Commands::Migrate => {
            tracing::info!("Migrations are up to date");
            println!("Migrations applied to main and audit databases");
        }
        Commands::CreateAdmin { name, email } => {
            admin::create_admin(app_data, &name, &email).await?;
        }
    }

    Ok(())
}
