use std::sync::Arc;
use std::time::Duration;

use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime, Timeouts};
use tokio::sync::RwLock;
use tokio_postgres::NoTls;

use crate::error::{AppError, Result};
use crate::models::{Exercise, Workout};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS exercises (
    id          UUID PRIMARY KEY,
    name        VARCHAR(200) NOT NULL,
    description VARCHAR(2000),
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS workouts (
    id           UUID PRIMARY KEY,
    workout_date DATE NOT NULL,
    note         VARCHAR(1000),
    created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS sets (
    id            UUID PRIMARY KEY,
    workout_id    UUID NOT NULL REFERENCES workouts (id) ON DELETE CASCADE,
    position      BIGSERIAL,
    reps          INTEGER NOT NULL,
    weight        NUMERIC(6, 2) NOT NULL,
    exercise_name VARCHAR(200) NOT NULL
);

CREATE INDEX IF NOT EXISTS sets_workout_position_idx ON sets (workout_id, position);
"#;

/// Storage backend shared by all repositories.
#[derive(Clone)]
pub enum Db {
    /// PostgreSQL through a connection pool.
    Postgres(Pool),
    /// Process-local tables, used when no database is configured and in tests.
    Memory(MemoryStore),
}

impl Db {
    /// Opens a PostgreSQL pool and makes sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url)?;
        ensure_schema(&pool).await?;
        Ok(Db::Postgres(pool))
    }

    pub fn memory() -> Self {
        Db::Memory(MemoryStore::default())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Db::Postgres(_) => "postgres",
            Db::Memory(_) => "memory",
        }
    }
}

/// In-memory tables. Rows keep insertion order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub(crate) tables: Arc<RwLock<MemoryTables>>,
}

#[derive(Default)]
pub(crate) struct MemoryTables {
    pub(crate) exercises: Vec<Exercise>,
    pub(crate) workouts: Vec<Workout>,
}

/// Creates a new database connection pool.
///
/// # Arguments
///
/// * `database_url` - The URL of the PostgreSQL database.
///
/// # Returns
///
/// A `Result` containing the `Pool`.
pub fn create_pool(database_url: &str) -> Result<Pool> {
    let mut cfg = Config::new();
    cfg.url = Some(database_url.to_string());

    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    let mut pool_cfg = PoolConfig::new(16);
    pool_cfg.timeouts = Timeouts {
        wait: Some(Duration::from_secs(5)),
        create: Some(Duration::from_secs(2)),
        recycle: Some(Duration::from_secs(1)),
    };
    cfg.pool = Some(pool_cfg);

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(|e| AppError::Internal(format!("Failed to create pool: {e}")))
}

/// Creates the tables if they do not exist yet.
pub async fn ensure_schema(pool: &Pool) -> Result<()> {
    let client = pool.get().await?;
    client.batch_execute(SCHEMA).await?;
    tracing::info!("Database schema verified");
    Ok(())
}
