use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::Exercise,
    repositories::exercise as exercise_repo,
    state::AppState,
};

/// Creates a new exercise.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `name` - The exercise name, already validated and trimmed.
/// * `description` - The optional description.
///
/// # Returns
///
/// A `Result` containing the created `Exercise`.
pub async fn create_exercise(
    state: &AppState,
    name: String,
    description: Option<String>,
) -> Result<Exercise> {
    let exercise = exercise_repo::create(&state.db, Uuid::new_v4(), name, description).await?;
    tracing::info!(exercise_id = %exercise.id, "Exercise created");
    Ok(exercise)
}

/// Lists all exercises.
pub async fn list_exercises(state: &AppState) -> Result<Vec<Exercise>> {
    exercise_repo::list(&state.db).await
}

/// Gets an exercise, failing with a not-found error naming the exercise.
pub async fn get_exercise(state: &AppState, exercise_id: Uuid) -> Result<Exercise> {
    exercise_repo::get(&state.db, exercise_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Exercise not found".to_string()))
}
