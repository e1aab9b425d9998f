//! Customer services menu.

use axum::{extract::State, response::Html};

use crate::{error::AppError, routes::AppState};

/// Menu page linking all nine operation pages.
///
/// Served at both `/` and `/services`.
pub async fn show_services(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.views.services()
}
