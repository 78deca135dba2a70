//! Cart commands. All of them require login.
//!
//! # Usage
//!
//! ```bash
//! eleegon cart add 3 --quantity 2
//! eleegon cart add 12 --electronics
//! eleegon cart set-quantity 3 5
//! eleegon cart set-quantity 3 0        # asks before removing
//! eleegon cart remove 12 --electronics --yes
//! eleegon cart list
//! eleegon cart total
//! ```

use eleegon_core::{CartSource, ProductId};
use eleegon_storefront::cart::{CartEntry, QuantityOutcome};
use eleegon_storefront::error::{AppError, add_breadcrumb};
use eleegon_storefront::state::AppState;

use super::{confirm, require_login};

const fn source_of(electronics: bool) -> CartSource {
    if electronics {
        CartSource::Electronics
    } else {
        CartSource::Apparel
    }
}

/// Print every entry, apparel first, then the total.
pub async fn list(state: &AppState) -> Result<(), AppError> {
    require_login(state).await?;
    let entries = state.cart().load_all().await?;
    if entries.is_empty() {
        println!("Your cart is empty.");
        return Ok(());
    }
    for entry in &entries {
        print_entry(entry);
    }
    println!("Total: ${}", state.cart().format_total().await);
    Ok(())
}

/// Fetch a product and add `quantity` units of it.
pub async fn add(
    state: &AppState,
    id: i64,
    electronics: bool,
    quantity: u32,
) -> Result<(), AppError> {
    require_login(state).await?;
    let id = ProductId::new(id);
    let line = if electronics {
        state
            .catalog()
            .electronics_product(id)
            .await?
            .to_cart_line(quantity)
    } else {
        state.catalog().apparel_product(id).await?.to_cart_line(quantity)
    };

    state.cart().load_all().await?;
    let entry = state.cart().add(line).await?;
    let id = entry.id().to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("source", entry.source().as_str()), ("id", &id)]),
    );
    println!("Added to cart.");
    print_entry(&entry);
    println!("Total: ${}", state.cart().format_total().await);
    Ok(())
}

/// Remove an entry after confirmation.
pub async fn remove(
    state: &AppState,
    id: i64,
    electronics: bool,
    yes: bool,
) -> Result<(), AppError> {
    require_login(state).await?;
    state.cart().load_all().await?;
    remove_confirmed(state, ProductId::new(id), source_of(electronics), yes).await
}

/// Set an entry's quantity. Anything below 1 turns into a confirmed removal.
pub async fn set_quantity(
    state: &AppState,
    id: i64,
    electronics: bool,
    quantity: i64,
    yes: bool,
) -> Result<(), AppError> {
    require_login(state).await?;
    state.cart().load_all().await?;

    match state
        .cart()
        .set_quantity(ProductId::new(id), source_of(electronics), quantity)
        .await?
    {
        QuantityOutcome::Updated(entry) => {
            print_entry(&entry);
            println!("Total: ${}", state.cart().format_total().await);
        }
        QuantityOutcome::RemovalRequested { id, source } => {
            remove_confirmed(state, id, source, yes).await?;
        }
        QuantityOutcome::NotFound => {
            return Err(AppError::NotFound(format!(
                "{} product {id} in cart",
                source_of(electronics)
            )));
        }
    }
    Ok(())
}

/// Print the cart total.
pub async fn total(state: &AppState) -> Result<(), AppError> {
    require_login(state).await?;
    state.cart().load_all().await?;
    let summary = state.cart().summary();
    println!("{} item(s), total ${}", summary.item_count, summary.total);
    Ok(())
}

async fn remove_confirmed(
    state: &AppState,
    id: ProductId,
    source: CartSource,
    yes: bool,
) -> Result<(), AppError> {
    if !state.cart().entries().await.iter().any(|e| e.is(id, source)) {
        return Err(AppError::NotFound(format!("{source} product {id} in cart")));
    }
    if !confirm("Do you want to remove this item from cart?", yes).await? {
        println!("Kept in cart.");
        return Ok(());
    }
    state.cart().remove(id, source).await?;
    let id = id.to_string();
    add_breadcrumb(
        "cart",
        "Removed from cart",
        Some(&[("source", source.as_str()), ("id", &id)]),
    );
    println!("Removed from cart.");
    println!("Total: ${}", state.cart().format_total().await);
    Ok(())
}

fn print_entry(entry: &CartEntry) {
    println!(
        "[{:<11}] #{:<4} {} x{} @ {} = {}",
        entry.source().as_str(),
        entry.id().as_i64(),
        entry.title(),
        entry.quantity(),
        entry.unit_price().display(),
        entry.total_price().display()
    );
}
