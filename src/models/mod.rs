pub mod exercise;
pub mod weight;
pub mod workout;

pub use exercise::Exercise;
pub use weight::{Weight, WeightError};
pub use workout::{Workout, WorkoutSet};
