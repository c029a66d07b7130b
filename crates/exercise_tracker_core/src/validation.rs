//! crates/exercise_tracker_core/src/validation.rs
//!
//! Field-level checks for user and exercise input.

/// A rejected input field. The display text is what clients see.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} field does not exist")]
    Missing(&'static str),
    #[error("{0} input required")]
    Empty(&'static str),
    #[error("duration must be a number of at least 1")]
    InvalidDuration,
}

/// Requires a text field to be present and not blank.
pub fn require_text<'a>(
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, ValidationError> {
    match value {
        None => Err(ValidationError::Missing(field)),
        Some(text) if text.trim().is_empty() => Err(ValidationError::Empty(field)),
        Some(text) => Ok(text),
    }
}

/// Requires a duration in minutes: any finite number, at least 1.
pub fn require_duration(value: Option<&str>) -> Result<f64, ValidationError> {
    let text = require_text("duration", value)?.trim();
    let minutes = text
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidDuration)?;

    // `parse` also accepts "NaN" and "inf".
    if !minutes.is_finite() || minutes < 1.0 {
        return Err(ValidationError::InvalidDuration);
    }
    Ok(minutes)
}
