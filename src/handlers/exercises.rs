use axum::{extract::State, http::StatusCode, response::Response};
use garde::Validate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::Result,
    extract::{ApiPath, ValidJson},
    services::exercises as exercise_service,
    state::AppState,
    validation::fields::plain_name,
};

use super::json_response;

/// The request payload for creating an exercise.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExerciseRequest {
    #[garde(length(chars, min = 1, max = 200), custom(plain_name))]
    pub name: String,
    #[garde(length(chars, max = 2000))]
    pub description: Option<String>,
}

/// Creates a new exercise.
#[axum::debug_handler]
pub async fn create_exercise(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateExerciseRequest>,
) -> Result<Response> {
    let exercise = exercise_service::create_exercise(
        &state,
        req.name.trim().to_string(),
        req.description,
    )
    .await?;

    json_response(StatusCode::CREATED, &exercise)
}

/// Lists all exercises.
#[axum::debug_handler]
pub async fn list_exercises(State(state): State<AppState>) -> Result<Response> {
    let exercises = exercise_service::list_exercises(&state).await?;
    json_response(StatusCode::OK, &exercises)
}

/// Gets a single exercise.
#[axum::debug_handler]
pub async fn get_exercise(
    State(state): State<AppState>,
    ApiPath(exercise_id): ApiPath<Uuid>,
) -> Result<Response> {
    let exercise = exercise_service::get_exercise(&state, exercise_id).await?;
    json_response(StatusCode::OK, &exercise)
}
