// ABOUTME: Input text normalization for required fields
// ABOUTME: Trims user-supplied strings and rejects blank or oversized values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use crate::errors::{AppError, AppResult};

/// Trim `value` and require it to be non-empty and at most `max_chars` long
///
/// # Errors
///
/// Returns a validation error naming `field` when the value is blank or too long
pub fn required_text(field: &str, value: &str, max_chars: usize) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field(field));
    }
    if trimmed.chars().count() > max_chars {
        return Err(AppError::invalid_input(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional value, mapping blank to `None`
#[must_use]
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("title", "  Ohm's law ", 50).unwrap(), "Ohm's law");
    }

    #[test]
    fn test_required_text_rejects_blank() {
        let err = required_text("title", " \n\t", 50).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
    }

    #[test]
    fn test_required_text_rejects_oversized() {
        let err = required_text("title", "abcdef", 3).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(Some(" Algebra ")), Some("Algebra".to_owned()));
        assert_eq!(optional_text(None), None);
    }
}
