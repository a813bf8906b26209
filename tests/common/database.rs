//! Test database utilities
//!
//! Provides in-memory SQLite database for testing without external dependencies.
//! Each test gets an isolated database instance using SeaORM.

use llmgate::config::DatabaseConfig;
use llmgate::storage::database::Database;
use std::sync::Arc;

/// Test database wrapper providing isolated in-memory SQLite instances
#[derive(Debug, Clone)]
pub struct TestDatabase {
    inner: Arc<Database>,
}

impl TestDatabase {
    /// Create a new in-memory test database with migrations applied
    pub async fn new() -> Self {
        let db = Database::new(&test_db_config())
            .await
            .expect("Failed to create in-memory test database");

        db.migrate()
            .await
            .expect("Failed to run database migrations");

        Self {
            inner: Arc::new(db),
        }
    }

    /// Get reference to the underlying database
    pub fn db(&self) -> &Database {
        &self.inner
    }

    /// Get Arc to the underlying database
    pub fn db_arc(&self) -> Arc<Database> {
        Arc::clone(&self.inner)
    }
}

/// Helper to create a simple test database config
pub fn test_db_config() -> DatabaseConfig {
    DatabaseConfig {
        // In-memory SQLite only supports a single connection
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        connection_timeout: 5,
        enabled: true,
    }
}
