use std::collections::HashMap;

use chrono::NaiveDate;
use deadpool_postgres::Pool;
use uuid::Uuid;

use crate::{
    db::Db,
    error::Result,
    models::{Workout, WorkoutSet},
};

const SELECT_SETS: &str = r#"
    SELECT id, workout_id, reps, (weight * 100)::BIGINT AS weight_hundredths, exercise_name
    FROM sets
"#;

/// Inserts a new workout without sets.
pub async fn create(
    db: &Db,
    id: Uuid,
    workout_date: NaiveDate,
    note: Option<String>,
) -> Result<Workout> {
    match db {
        Db::Postgres(pool) => {
            let client = pool.get().await?;
            let row = client
                .query_one(
                    r#"
                    INSERT INTO workouts (id, workout_date, note)
                    VALUES ($1, $2, $3)
                    RETURNING id, workout_date, note
                    "#,
                    &[&id, &workout_date, &note],
                )
                .await?;
            Ok(Workout::from_row(&row))
        }
        Db::Memory(store) => {
            let workout = Workout {
                id,
                workout_date,
                note,
                sets: Vec::new(),
            };
            store.tables.write().await.workouts.push(workout.clone());
            Ok(workout)
        }
    }
}

/// Lists all workouts in creation order, each with its sets.
pub async fn list(db: &Db) -> Result<Vec<Workout>> {
    match db {
        Db::Postgres(pool) => {
            let client = pool.get().await?;
            let workout_rows = client
                .query(
                    "SELECT id, workout_date, note FROM workouts ORDER BY created_at, id",
                    &[],
                )
                .await?;
            let set_rows = client
                .query(&format!("{SELECT_SETS} ORDER BY position"), &[])
                .await?;

            let mut sets_by_workout: HashMap<Uuid, Vec<WorkoutSet>> = HashMap::new();
            for row in &set_rows {
                sets_by_workout
                    .entry(row.get("workout_id"))
                    .or_default()
                    .push(WorkoutSet::from(row));
            }

            Ok(workout_rows
                .iter()
                .map(|row| {
                    let mut workout = Workout::from_row(row);
                    workout.sets = sets_by_workout.remove(&workout.id).unwrap_or_default();
                    workout
                })
                .collect())
        }
        Db::Memory(store) => Ok(store.tables.read().await.workouts.clone()),
    }
}

/// Finds a workout by its ID, including its sets.
pub async fn get(db: &Db, id: Uuid) -> Result<Option<Workout>> {
    match db {
        Db::Postgres(pool) => get_from_pool(pool, id).await,
        Db::Memory(store) => Ok(store
            .tables
            .read()
            .await
            .workouts
            .iter()
            .find(|workout| workout.id == id)
            .cloned()),
    }
}

async fn get_from_pool(pool: &Pool, id: Uuid) -> Result<Option<Workout>> {
    let client = pool.get().await?;
    let Some(row) = client
        .query_opt(
            "SELECT id, workout_date, note FROM workouts WHERE id = $1",
            &[&id],
        )
        .await?
    else {
        return Ok(None);
    };

    let set_rows = client
        .query(
            &format!("{SELECT_SETS} WHERE workout_id = $1 ORDER BY position"),
            &[&id],
        )
        .await?;

    let mut workout = Workout::from_row(&row);
    workout.sets = set_rows.iter().map(WorkoutSet::from).collect();
    Ok(Some(workout))
}

/// Appends `set` to a workout.
///
/// # Returns
///
/// The updated workout, or `None` if the workout does not exist.
pub async fn add_set(db: &Db, workout_id: Uuid, set: WorkoutSet) -> Result<Option<Workout>> {
    match db {
        Db::Postgres(pool) => {
            {
                let mut client = pool.get().await?;
                let transaction = client.transaction().await?;

                let exists = transaction
                    .query_opt(
                        "SELECT id FROM workouts WHERE id = $1 FOR UPDATE",
                        &[&workout_id],
                    )
                    .await?;
                if exists.is_none() {
                    return Ok(None);
                }

                transaction
                    .execute(
                        r#"
                        INSERT INTO sets (id, workout_id, reps, weight, exercise_name)
                        VALUES ($1, $2, $3, ($4::BIGINT)::NUMERIC / 100, $5)
                        "#,
                        &[
                            &set.id,
                            &workout_id,
                            &set.reps,
                            &set.weight.hundredths(),
                            &set.exercise_name,
                        ],
                    )
                    .await?;
                transaction.commit().await?;
            }

            get_from_pool(pool, workout_id).await
        }
        Db::Memory(store) => {
            let mut tables = store.tables.write().await;
            Ok(tables
                .workouts
                .iter_mut()
                .find(|workout| workout.id == workout_id)
                .map(|workout| {
                    workout.sets.push(set);
                    workout.clone()
                }))
        }
    }
}

/// Deletes a workout and, through the cascade, its sets.
///
/// # Returns
///
/// `true` if a workout was removed.
pub async fn delete(db: &Db, id: Uuid) -> Result<bool> {
    match db {
        Db::Postgres(pool) => {
            let client = pool.get().await?;
            let affected = client
                .execute("DELETE FROM workouts WHERE id = $1", &[&id])
                .await?;
            Ok(affected > 0)
        }
        Db::Memory(store) => {
            let mut tables = store.tables.write().await;
            let before = tables.workouts.len();
            tables.workouts.retain(|workout| workout.id != id);
            Ok(tables.workouts.len() < before)
        }
    }
}
