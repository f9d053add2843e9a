use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};

/// Connection pool plus the schema every table lives in
#[derive(Clone, Debug)]
pub struct Database {
    database_pool: PgPool,
    database_schema: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub db: String,
    pub schema: String,
    pub credentials: DatabaseCredentials,
    pub connection: DatabaseConnection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConnection {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

fn default_port() -> u16 {
    5432
}

impl DatabaseSettings {
    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.credentials.username)
            .password(&self.credentials.password)
            .database(&self.db)
            .options([("search_path", self.schema.as_str())])
            .ssl_mode(PgSslMode::Prefer)
    }
}

impl DatabaseConnection {
    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_seconds))
    }
}

static DATABASE: OnceLock<Database> = OnceLock::new();

/// Opens the shared pool once per process and hands out a `'static` reference to it.
pub async fn connect(settings: &DatabaseSettings) -> Result<&'static Database, anyhow::Error> {
    if let Some(database) = DATABASE.get() {
        return Ok(database);
    }

    let pool = settings
        .connection
        .pool_options()
        .connect_with(settings.connect_options())
        .await
        .with_context(|| format!("failed to open database at {}/{}", settings.host, settings.db))?;
    tracing::info!(host = %settings.host, db = %settings.db, schema = %settings.schema, "database pool opened");

    Ok(DATABASE.get_or_init(|| Database {
        database_pool: pool,
        database_schema: settings.schema.clone(),
    }))
}

impl Database {
    pub fn database_pool(&self) -> &PgPool {
        &self.database_pool
    }

    pub fn database_schema(&self) -> &str {
        &self.database_schema
    }
}
