//! Gateway results consumed by the page templates.
//!
//! This module defines:
//! - `Item`: the kind of record a lookup targeted
//! - `Failure`: a backend rejection, whose `Display` is the message shown to the user
//! - `Outcome`: the title/detail pair (plus optional account rows) rendered in the results panel

use serde::Serialize;

use crate::models::account::AccountRow;

/// Generic message for anything the gateway cannot interpret.
///
/// Used for malformed responses, unexpected HTTP statuses and unrecognized
/// fail-codes. The underlying detail is only ever logged.
pub const REQUEST_ERROR_MESSAGE: &str =
    "There was an error processing the request; Please try again later or check logs for more info.";

/// Fixed message for transport failures (refused, unresolved, timed out).
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection refused or failed to resolve; Are you using the right address and port? Is the server running?";

pub const REQUEST_ERROR_TITLE: &str = "Request Error";

/// Record type named in "not found" messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    Account,
    Customer,
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Item::Account => f.write_str("account"),
            Item::Customer => f.write_str("customer"),
        }
    }
}

/// A rejection reported by the backend in its commarea.
///
/// Every envelope with a failure flag maps to exactly one variant; codes
/// without a dedicated variant become `Unexpected`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    #[error("The {0} you searched for could not be found; Try a different {0} number.")]
    NotFound(Item),

    #[error("Too many accounts for customer number {customer_number}; Try deleting an account first.")]
    TooManyAccounts { customer_number: String },

    #[error("{0}")]
    InvalidArgument(&'static str),

    /// Fail-code the gateway has no rule for. Carries the raw code for the logs.
    #[error("{}", REQUEST_ERROR_MESSAGE)]
    Unexpected { code: String },
}

impl Failure {
    pub fn unexpected(code: impl std::fmt::Display) -> Self {
        Failure::Unexpected {
            code: code.to_string(),
        }
    }
}

/// Classification of an `Outcome`, used by templates for styling and by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    NotFound,
    TooManyAccounts,
    InvalidArgument,
    ConnectionError,
    RequestError,
    UnexpectedError,
}

impl From<&Failure> for OutcomeKind {
    fn from(failure: &Failure) -> Self {
        match failure {
            Failure::NotFound(_) => OutcomeKind::NotFound,
            Failure::TooManyAccounts { .. } => OutcomeKind::TooManyAccounts,
            Failure::InvalidArgument(_) => OutcomeKind::InvalidArgument,
            Failure::Unexpected { .. } => OutcomeKind::UnexpectedError,
        }
    }
}

/// Display result of one gateway call.
///
/// # JSON Example (template context)
///
/// ```json
/// {
///   "kind": "not_found",
///   "title": "Request Error",
///   "detail": "The account you searched for could not be found; Try a different account number.",
///   "rows": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub kind: OutcomeKind,

    /// Large heading of the results panel
    pub title: String,

    /// Body text of the results panel; one `Label: value` per line on success
    pub detail: String,

    /// Account table, only populated by a successful "list accounts"
    pub rows: Option<Vec<AccountRow>>,
}

impl Outcome {
    pub fn success(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Success,
            title: title.into(),
            detail: detail.into(),
            rows: None,
        }
    }

    pub fn with_rows(mut self, rows: Vec<AccountRow>) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn connection_error(title: &str) -> Self {
        Self {
            kind: OutcomeKind::ConnectionError,
            title: title.to_string(),
            detail: CONNECTION_ERROR_MESSAGE.to_string(),
            rows: None,
        }
    }

    pub fn request_error() -> Self {
        Self {
            kind: OutcomeKind::RequestError,
            title: REQUEST_ERROR_TITLE.to_string(),
            detail: REQUEST_ERROR_MESSAGE.to_string(),
            rows: None,
        }
    }

    /// Outcome for a backend rejection.
    ///
    /// Unexpected codes always use the generic request-error title; named
    /// failures use the operation's rejection title.
    pub fn rejected(rejection_title: &str, failure: &Failure) -> Self {
        let title = match failure {
            Failure::Unexpected { .. } => REQUEST_ERROR_TITLE,
            _ => rejection_title,
        };
        Self {
            kind: failure.into(),
            title: title.to_string(),
            detail: failure.to_string(),
            rows: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_item_twice() {
        assert_eq!(
            Failure::NotFound(Item::Customer).to_string(),
            "The customer you searched for could not be found; Try a different customer number."
        );
    }

    #[test]
    fn too_many_accounts_message() {
        let failure = Failure::TooManyAccounts {
            customer_number: "4455".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "Too many accounts for customer number 4455; Try deleting an account first."
        );
    }

    #[test]
    fn unexpected_hides_the_code() {
        let outcome = Outcome::rejected("Account Error", &Failure::unexpected("Z"));
        assert_eq!(outcome.kind, OutcomeKind::UnexpectedError);
        assert_eq!(outcome.title, REQUEST_ERROR_TITLE);
        assert_eq!(outcome.detail, REQUEST_ERROR_MESSAGE);
    }

    #[test]
    fn named_rejection_uses_operation_title() {
        let outcome = Outcome::rejected("Update Error", &Failure::NotFound(Item::Account));
        assert_eq!(outcome.kind, OutcomeKind::NotFound);
        assert_eq!(outcome.title, "Update Error");
    }
}
