use uuid::Uuid;

use crate::{db::Db, error::Result, models::Exercise};

/// Inserts a new exercise.
pub async fn create(
    db: &Db,
    id: Uuid,
    name: String,
    description: Option<String>,
) -> Result<Exercise> {
    match db {
        Db::Postgres(pool) => {
            let client = pool.get().await?;
            let row = client
                .query_one(
                    r#"
                    INSERT INTO exercises (id, name, description)
                    VALUES ($1, $2, $3)
                    RETURNING id, name, description
                    "#,
                    &[&id, &name, &description],
                )
                .await?;
            Ok(Exercise::from(&row))
        }
        Db::Memory(store) => {
            let exercise = Exercise { id, name, description };
            store.tables.write().await.exercises.push(exercise.clone());
            Ok(exercise)
        }
    }
}

/// Lists all exercises in creation order.
pub async fn list(db: &Db) -> Result<Vec<Exercise>> {
    match db {
        Db::Postgres(pool) => {
            let client = pool.get().await?;
            let rows = client
                .query(
                    "SELECT id, name, description FROM exercises ORDER BY created_at, id",
                    &[],
                )
                .await?;
            Ok(rows.iter().map(Exercise::from).collect())
        }
        Db::Memory(store) => Ok(store.tables.read().await.exercises.clone()),
    }
}

/// Finds an exercise by its ID.
pub async fn get(db: &Db, id: Uuid) -> Result<Option<Exercise>> {
    match db {
        Db::Postgres(pool) => {
            let client = pool.get().await?;
            let row = client
                .query_opt(
                    "SELECT id, name, description FROM exercises WHERE id = $1",
                    &[&id],
                )
                .await?;
            Ok(row.as_ref().map(Exercise::from))
        }
        Db::Memory(store) => Ok(store
            .tables
            .read()
            .await
            .exercises
            .iter()
            .find(|exercise| exercise.id == id)
            .cloned()),
    }
}
