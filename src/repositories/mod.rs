pub mod exercise;
pub mod workout;
