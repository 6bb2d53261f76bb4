use migration::{AuditMigrator, MainMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::config::Settings;
use crate::errors::InternalError;

/// Connections to the main database and the security audit database
#[derive(Debug, Clone)]
pub struct DatabaseConnections {
    pub main: DatabaseConnection,
    pub audit: DatabaseConnection,
}

impl DatabaseConnections {
    /// Connect to both databases
    ///
    /// Does NOT run migrations - call `migrate()` separately.
    ///
    /// # Arguments
    /// * `database_url` - Main database (users, assets, tokens, activity)
    /// * `audit_database_url` - Security audit database
    ///
    /// # Returns
    /// * `Ok(DatabaseConnections)` - Both connections established
    /// * `Err(InternalError)` - Either connection failed
    pub async fn connect(
        database_url: &str,
        audit_database_url: &str,
    ) -> Result<Self, InternalError> {
        let main = Database::connect(database_url)
            .await
            .map_err(|e| InternalError::database("connect_database", e))?;
        tracing::debug!("Connected to main database: {}", database_url);

        let audit = Database::connect(audit_database_url)
            .await
            .map_err(|e| InternalError::database("connect_audit_database", e))?;
        tracing::debug!("Connected to audit database: {}", audit_database_url);

        Ok(Self { main, audit })
    }

    /// Connect using the URLs from settings
    pub async fn from_settings(settings: &Settings) -> Result<Self, InternalError> {
        Self::connect(settings.database_url(), settings.audit_database_url()).await
    }

    /// Run all pending migrations on both databases
    pub async fn migrate(&self) -> Result<(), InternalError> {
        MainMigrator::up(&self.main, None)
            .await
            .map_err(|e| InternalError::database("run_migrations", e))?;
        tracing::debug!("Main database migrations completed");

        AuditMigrator::up(&self.audit, None)
            .await
            .map_err(|e| InternalError::database("run_audit_migrations", e))?;
        tracing::debug!("Audit database migrations completed");

        Ok(())
    }
}
