use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use garde::Validate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    extract::{ApiPath, ApiQuery, ValidJson},
    services::workouts as workout_service,
    state::AppState,
    validation::fields::{WeightInput, clean_note, weight_precision},
};

use super::json_response;

/// The request payload for creating a workout.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkoutRequest {
    #[garde(skip)]
    pub workout_date: NaiveDate,
    #[garde(length(chars, max = 1000))]
    pub note: Option<String>,
}

/// The request payload for adding a set.
#[derive(Debug, Deserialize, Validate)]
pub struct AddSetRequest {
    #[garde(range(min = 1, max = 1000))]
    pub reps: i64,
    #[garde(custom(weight_precision))]
    pub weight: WeightInput,
}

/// The query parameters for adding a set.
#[derive(Debug, Deserialize)]
pub struct AddSetQuery {
    pub exercise_id: Uuid,
}

/// Creates a new workout.
#[axum::debug_handler]
pub async fn create_workout(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateWorkoutRequest>,
) -> Result<Response> {
    let workout =
        workout_service::create_workout(&state, req.workout_date, clean_note(req.note)).await?;
    json_response(StatusCode::CREATED, &workout)
}

/// Lists all workouts with their sets.
#[axum::debug_handler]
pub async fn list_workouts(State(state): State<AppState>) -> Result<Response> {
    let workouts = workout_service::list_workouts(&state).await?;
    json_response(StatusCode::OK, &workouts)
}

/// Gets a single workout.
#[axum::debug_handler]
pub async fn get_workout(
    State(state): State<AppState>,
    ApiPath(workout_id): ApiPath<Uuid>,
) -> Result<Response> {
    let workout = workout_service::get_workout(&state, workout_id).await?;
    json_response(StatusCode::OK, &workout)
}

/// Adds a set to a workout.
#[axum::debug_handler]
pub async fn add_set(
    State(state): State<AppState>,
    ApiPath(workout_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<AddSetQuery>,
    ValidJson(req): ValidJson<AddSetRequest>,
) -> Result<Response> {
    // Both conversions were checked by the garde rules above.
    let reps = i32::try_from(req.reps)
        .map_err(|_| AppError::Internal(format!("reps {} passed validation", req.reps)))?;
    let weight = req
        .weight
        .parse()
        .map_err(|e| AppError::Internal(format!("weight passed validation: {e}")))?;

    let workout =
        workout_service::add_set(&state, workout_id, query.exercise_id, reps, weight).await?;
    json_response(StatusCode::OK, &workout)
}

/// Deletes a workout and its sets.
#[axum::debug_handler]
pub async fn delete_workout(
    State(state): State<AppState>,
    ApiPath(workout_id): ApiPath<Uuid>,
) -> Result<Response> {
    workout_service::delete_workout(&state, workout_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
