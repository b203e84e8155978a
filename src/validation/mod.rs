pub mod fields;

use crate::error::{AppError, FieldViolation};

impl From<garde::Report> for AppError {
    fn from(report: garde::Report) -> Self {
        let violations = report
            .iter()
            .map(|(path, error)| FieldViolation::new(path.to_string(), error.to_string()))
            .collect();
        AppError::Validation(violations)
    }
}
