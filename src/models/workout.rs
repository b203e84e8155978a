use chrono::NaiveDate;
use serde::Serialize;
use tokio_postgres::Row;
use uuid::Uuid;

use super::weight::Weight;

/// A training session on a given date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workout {
    /// The unique identifier for the workout.
    pub id: Uuid,
    /// The calendar date of the session.
    pub workout_date: NaiveDate,
    /// An optional note with control characters already stripped.
    pub note: Option<String>,
    /// Sets in the order they were added.
    pub sets: Vec<WorkoutSet>,
}

impl Workout {
    /// Builds a workout from a `workouts` row. Sets are loaded separately.
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            workout_date: row.get("workout_date"),
            note: row.get("note"),
            sets: Vec::new(),
        }
    }
}

/// One exercise performed for `reps` repetitions at `weight`.
///
/// `exercise_name` is copied from the exercise when the set is recorded and
/// is not updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSet {
    pub id: Uuid,
    pub reps: i32,
    pub weight: Weight,
    pub exercise_name: String,
}

impl From<&Row> for WorkoutSet {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            reps: row.get("reps"),
            weight: Weight::from_hundredths(row.get("weight_hundredths")),
            exercise_name: row.get("exercise_name"),
        }
    }
}
