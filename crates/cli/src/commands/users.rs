//! User directory.

use eleegon_storefront::catalog::search_users;
use eleegon_storefront::error::AppError;
use eleegon_storefront::loaded::Loaded;
use eleegon_storefront::state::AppState;

use super::{notice_fallback, require_login};

/// List users matching `search`. Requires login.
pub async fn list(state: &AppState, search: &str) -> Result<(), AppError> {
    require_login(state).await?;
    let loaded = Loaded::or_default(state.catalog().users().await);
    notice_fallback(&loaded);

    let matches = search_users(loaded.data(), search);
    if matches.is_empty() {
        println!("No users found.");
    }
    for user in matches {
        print_user_row(user);
    }
    Ok(())
}

pub(super) fn print_user_row(user: &eleegon_storefront::catalog::User) {
    println!(
        "#{:<4} {:<24} {:<32} {}",
        user.id.as_i64(),
        user.name.full(),
        user.email,
        user.phone
    );
}
