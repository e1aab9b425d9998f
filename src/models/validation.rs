//! Field-level validation of submitted forms.
//!
//! Forms arrive as raw strings so that bad input can be echoed back with a
//! message instead of being rejected by the extractor.

use serde::Serialize;

/// One problem with one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All problems found in a submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Returns `value` when no error has been recorded.
    pub fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Check a required all-digits identifier of at most `max_digits` digits and
/// return it trimmed, leading zeros kept.
pub fn digits(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
    max_digits: usize,
) -> String {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, "must not be empty");
    } else if !value.chars().all(|c| c.is_ascii_digit()) {
        errors.add(field, "must contain digits only");
    } else if value.len() > max_digits {
        errors.add(field, format!("must be at most {max_digits} digits"));
    } else {
        return value.to_string();
    }
    String::new()
}

/// Like [`digits`] but parsed; invalid input yields `0` alongside the error.
pub fn identifier(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
    max_digits: usize,
) -> u64 {
    digits(errors, field, raw, max_digits)
        .parse()
        .unwrap_or_default()
}

/// Require a non-blank value no longer than `max_len` characters.
pub fn text(errors: &mut ValidationErrors, field: &'static str, raw: &str, max_len: usize) -> String {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, "must not be empty");
    } else {
        optional_text(errors, field, value, max_len);
    }
    value.to_string()
}

/// Like [`text`] but blank values are allowed.
pub fn optional_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
    max_len: usize,
) -> String {
    let value = raw.trim();
    if value.chars().count() > max_len {
        errors.add(field, format!("must be at most {max_len} characters"));
    }
    value.to_string()
}

/// Parse a non-negative decimal with at most two fractional digits, capped at `max`.
pub fn rate(errors: &mut ValidationErrors, field: &'static str, raw: &str, max: f64) -> f64 {
    let value = raw.trim();
    let fraction_ok = value
        .split_once('.')
        .is_none_or(|(_, fraction)| fraction.len() <= 2);
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && (0.0..=max).contains(&parsed) && fraction_ok => parsed,
        Ok(_) => {
            errors.add(
                field,
                format!("must be between 0 and {max:.2} with at most 2 decimal places"),
            );
            0.0
        }
        Err(_) => {
            errors.add(field, "must be a number");
            0.0
        }
    }
}

/// Parse a non-negative whole amount.
pub fn amount(errors: &mut ValidationErrors, field: &'static str, raw: &str) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(parsed) => parsed,
        Err(_) => {
            errors.add(field, "must be a whole number of 0 or more");
            0
        }
    }
}
