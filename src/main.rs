use std::sync::Arc;

use clap::Parser;
use poem::{Server, listener::TcpListener};

use maintrack_backend::api;
use maintrack_backend::app_data::AppData;
use maintrack_backend::cli::{self, Cli};
use maintrack_backend::config::{
    DatabaseConnections, LoggingConfig, SecretManager, Settings, SystemEnvironment, init_logging,
};
use maintrack_backend::providers::SystemClock;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let env = SystemEnvironment;

    init_logging(&LoggingConfig::from_env_provider(&env))?;

    let settings = Settings::from_env_provider(&env)?;
    let secret_manager = SecretManager::from_env_provider(&env)?;

    let connections = DatabaseConnections::from_settings(&settings).await?;
    connections.migrate().await?;
    tracing::info!("Database migrations completed");

    let app_data = Arc::new(AppData::new(
        connections,
        settings,
        secret_manager,
        Arc::new(SystemClock),
    ));

    if !cli.serves() {
        if let Some(command) = cli.command {
            cli::execute_command(command, app_data).await?;
        }
        return Ok(());
    }

    let address = app_data.settings.server_address();
    let app = api::build_routes(app_data);

    tracing::info!("Starting server on http://{}", address);
    tracing::info!("Swagger UI available at http://{}/swagger", address);

    Server::new(TcpListener::bind(address)).run(app).await?;
    Ok(())
}
