//! Shared pieces of the backend's commarea-style JSON envelopes.
//!
//! Every backend response is a single named record holding a success flag,
//! an optional fail-code and domain fields. The backend pads fixed-width
//! fields and is inconsistent about quoting numbers, so flags and codes are
//! compared trimmed and read leniently.

use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

use crate::models::outcome::{Failure, Outcome};

/// A response envelope the gateway knows how to classify.
pub trait Envelope: DeserializeOwned + std::fmt::Debug {
    /// The backend rejection carried by this envelope, if any.
    fn check(&self) -> Result<(), Failure>;

    /// Human-readable `Label: value` lines describing the record.
    fn details(&self) -> String;

    /// Success outcome for an envelope that passed [`Envelope::check`].
    fn into_outcome(self, title: &str) -> Outcome {
        Outcome::success(title, self.details())
    }
}

/// Sort code and record number pair used by the create commareas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordKey {
    #[serde(rename = "COMM_SORTCODE", default, deserialize_with = "lenient_string")]
    pub sort_code: String,

    #[serde(rename = "COMM_NUMBER", default, deserialize_with = "lenient_string")]
    pub number: String,
}

/// Compare a padded flag or code against an expected value.
pub fn flag_is(value: &str, expected: &str) -> bool {
    value.trim() == expected
}

/// True for identifiers the backend uses to mean "no record" (empty or all zeros).
pub fn is_zero_id(value: &str) -> bool {
    value.trim().trim_start_matches('0').is_empty()
}

/// Identifier without the backend's zero padding; `0` stays `0`.
pub fn unpadded(value: &str) -> String {
    let trimmed = value.trim().trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Format a `DDMMYYYY` commarea date as `DD/MM/YYYY`.
pub fn format_date(raw: u32) -> String {
    if raw == 0 {
        return "-".to_string();
    }
    format!(
        "{:02}/{:02}/{:04}",
        raw / 1_000_000,
        (raw / 10_000) % 100,
        raw % 10_000
    )
}

pub fn format_money(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Accepts a JSON string or number and keeps its textual form; `null` reads as empty.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Null => String::new(),
    })
}

/// Builder for the multi-line detail text shown on success.
#[derive(Debug, Default)]
pub struct Details(String);

impl Details {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, label: &str, value: impl Display) -> Self {
        if !self.0.is_empty() {
            self.0.push('\n');
        }
        self.0.push_str(&format!("{label}: {value}"));
        self
    }

    pub fn finish(self) -> String {
        self.0
    }
}
