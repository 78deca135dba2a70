//! CLI command implementations.
//!
//! Each submodule prints to stdout; logs go to stderr through `tracing`.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod users;

use eleegon_storefront::error::AppError;
use eleegon_storefront::loaded::Loaded;
use eleegon_storefront::session::SessionMarker;
use eleegon_storefront::state::AppState;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Evaluate a fresh access guard for a protected command.
async fn require_login(state: &AppState) -> Result<SessionMarker, AppError> {
    Ok(state.guard().require().await?)
}

/// Ask a yes/no question on stdin. `assume_yes` skips the prompt.
async fn confirm(prompt: &str, assume_yes: bool) -> Result<bool, AppError> {
    if assume_yes {
        return Ok(true);
    }
    eprint!("{prompt} [y/N] ");
    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .map_err(|e| AppError::Internal(format!("failed to read answer: {e}")))?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Print a notice when a listing fell back to empty data.
fn notice_fallback<T>(loaded: &Loaded<T>) {
    if let Some(error) = loaded.error() {
        eprintln!("Could not reach the store ({error}); showing no results.");
    }
}
