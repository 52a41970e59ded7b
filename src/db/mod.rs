use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::check_point::CheckPointRepository;
pub use repositories::entry_attempt::EntryAttemptRepository;
pub use repositories::user::UserRepository;

const IN_MEMORY_CONNECTION_LIFETIME: Duration = Duration::from_secs(365 * 24 * 3600);

/// Connection pool plus repository accessors.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1, Duration::from_secs(5)).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        // Every in-memory connection is its own database, so the pool is pinned to one.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(acquire_timeout)
            .sqlx_logging(false);

        // Recycling the connection would discard an in-memory database.
        let (idle_timeout, max_lifetime) = if in_memory {
            (IN_MEMORY_CONNECTION_LIFETIME, IN_MEMORY_CONNECTION_LIFETIME)
        } else {
            (Duration::from_secs(300), Duration::from_secs(600))
        };
        opt.idle_timeout(idle_timeout).max_lifetime(max_lifetime);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn check_point_repo(&self) -> CheckPointRepository {
        CheckPointRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn entry_attempt_repo(&self) -> EntryAttemptRepository {
        EntryAttemptRepository::new(self.conn.clone())
    }
}
