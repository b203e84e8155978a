use serde::Deserialize;

use crate::models::{Weight, WeightError};

/// A weight as sent by clients: decimal text (`"82.50"`) or a JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WeightInput {
    Text(String),
    Number(f64),
}

impl WeightInput {
    /// Parses into a [`Weight`]. Numbers go through their shortest decimal
    /// rendering, so `100.256` keeps its three fractional digits.
    pub fn parse(&self) -> Result<Weight, WeightError> {
        match self {
            WeightInput::Text(text) => text.parse(),
            WeightInput::Number(number) if number.is_finite() => number.to_string().parse(),
            WeightInput::Number(_) => Err(WeightError::NotANumber),
        }
    }
}

/// Names may not contain characters below U+0020 and may not be blank.
///
/// # Arguments
///
/// * `value` - The raw name.
///
/// # Returns
///
/// A `garde::Result` describing the first problem found.
pub fn plain_name(value: &str, _ctx: &()) -> garde::Result {
    if value.chars().any(|c| (c as u32) < 32) {
        return Err(garde::Error::new("Name cannot contain control characters"));
    }
    if value.trim().is_empty() {
        return Err(garde::Error::new("Name cannot be blank"));
    }
    Ok(())
}

pub fn weight_precision(value: &WeightInput, _ctx: &()) -> garde::Result {
    value
        .parse()
        .map(|_| ())
        .map_err(|e| garde::Error::new(e.to_string()))
}

/// Strips control characters other than tab, newline and carriage return,
/// then trims. Returns `None` when nothing is left.
pub fn clean_note(note: Option<String>) -> Option<String> {
    let cleaned: String = note?
        .chars()
        .filter(|c| (*c as u32) >= 32 || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
