use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Weight, Workout, WorkoutSet},
    repositories::{exercise as exercise_repo, workout as workout_repo},
    state::AppState,
};

/// Detail used when a set references an unknown exercise.
pub const EXERCISE_NOT_FOUND: &str = "Exercise not found to add set";
/// Detail used when a workout does not exist.
pub const WORKOUT_NOT_FOUND: &str = "Workout not found";

/// Creates a new workout with no sets.
pub async fn create_workout(
    state: &AppState,
    workout_date: NaiveDate,
    note: Option<String>,
) -> Result<Workout> {
    let workout = workout_repo::create(&state.db, Uuid::new_v4(), workout_date, note).await?;
    tracing::info!(workout_id = %workout.id, "Workout created");
    Ok(workout)
}

/// Lists all workouts with their sets.
pub async fn list_workouts(state: &AppState) -> Result<Vec<Workout>> {
    workout_repo::list(&state.db).await
}

/// Gets a workout with its sets.
pub async fn get_workout(state: &AppState, workout_id: Uuid) -> Result<Workout> {
    workout_repo::get(&state.db, workout_id)
        .await?
        .ok_or_else(|| AppError::NotFound(WORKOUT_NOT_FOUND.to_string()))
}

/// Records a set of `exercise_id` in a workout.
///
/// The exercise is resolved first and its current name copied onto the set.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `workout_id` - The workout receiving the set.
/// * `exercise_id` - The exercise performed.
/// * `reps` - Repetitions, already range-checked.
/// * `weight` - The load.
///
/// # Returns
///
/// The updated `Workout`, or a not-found error naming the missing entity.
pub async fn add_set(
    state: &AppState,
    workout_id: Uuid,
    exercise_id: Uuid,
    reps: i32,
    weight: Weight,
) -> Result<Workout> {
    let exercise = exercise_repo::get(&state.db, exercise_id)
        .await?
        .ok_or_else(|| AppError::NotFound(EXERCISE_NOT_FOUND.to_string()))?;

    let set = WorkoutSet {
        id: Uuid::new_v4(),
        reps,
        weight,
        exercise_name: exercise.name,
    };

    let workout = workout_repo::add_set(&state.db, workout_id, set)
        .await?
        .ok_or_else(|| AppError::NotFound(WORKOUT_NOT_FOUND.to_string()))?;

    tracing::info!(workout_id = %workout_id, exercise_id = %exercise_id, "Set added");
    Ok(workout)
}

/// Deletes a workout together with its sets.
pub async fn delete_workout(state: &AppState, workout_id: Uuid) -> Result<()> {
    if workout_repo::delete(&state.db, workout_id).await? {
        tracing::info!(workout_id = %workout_id, "Workout deleted");
        Ok(())
    } else {
        Err(AppError::NotFound(WORKOUT_NOT_FOUND.to_string()))
    }
}
