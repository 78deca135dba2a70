//! Store administration commands. All of them require login.
//!
//! Deletes and edits apply to the fetched listing only; the catalog APIs do
//! not persist them. Product creation is sent to the electronics API.
//!
//! # Usage
//!
//! ```bash
//! eleegon admin products --delete 1,2
//! eleegon admin electronics --edit 5 --price 249.99 --discount 10
//! eleegon admin create-product --title "Pixel Buds" --brand google --category audio
//! eleegon admin users --search john
//! ```

use clap::Args;
use eleegon_core::{ProductId, UserId};
use eleegon_storefront::admin::{Identified, Listing, ProductEdit};
use eleegon_storefront::catalog::{filter_apparel, filter_electronics, search_users};
use eleegon_storefront::error::AppError;
use eleegon_storefront::forms::ProductForm;
use eleegon_storefront::loaded::Loaded;
use eleegon_storefront::state::AppState;

use super::catalog::{print_apparel_row, print_electronics_row};
use super::users::print_user_row;
use super::{notice_fallback, require_login};

/// Electronics listing options, with an optional single-product edit.
#[derive(Args)]
pub struct ElectronicsArgs {
    /// Page to show
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Only this category
    #[arg(short, long)]
    category: Option<String>,
    /// Match title
    #[arg(short, long, default_value = "")]
    search: String,
    /// Remove these IDs from the listing
    #[arg(long, value_delimiter = ',')]
    delete: Vec<i64>,
    /// Edit the product with this ID
    #[arg(long)]
    edit: Option<i64>,
    /// New title
    #[arg(long, requires = "edit")]
    title: Option<String>,
    /// New brand
    #[arg(long, requires = "edit")]
    brand: Option<String>,
    /// New price
    #[arg(long, requires = "edit")]
    price: Option<String>,
    /// New discount percentage
    #[arg(long, requires = "edit")]
    discount: Option<String>,
    /// New category
    #[arg(long, requires = "edit")]
    set_category: Option<String>,
}

/// New product fields.
#[derive(Args)]
pub struct CreateProductArgs {
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    brand: String,
    #[arg(long, default_value = "")]
    model: String,
    #[arg(long, default_value = "")]
    color: String,
    #[arg(long, default_value = "")]
    category: String,
    /// Discount percentage (default 1)
    #[arg(long, default_value = "")]
    discount: String,
}

/// Apparel listing with local deletes.
pub async fn products(
    state: &AppState,
    category: &str,
    search: &str,
    delete: &[i64],
) -> Result<(), AppError> {
    require_login(state).await?;
    let loaded = Loaded::or_default(state.catalog().apparel_products().await);
    notice_fallback(&loaded);

    let mut listing = Listing::new(loaded.into_data());
    remove_all(&mut listing, delete.iter().copied().map(ProductId::new));

    for product in filter_apparel(listing.items(), search, category) {
        print_apparel_row(product);
    }
    println!("{} product(s)", listing.len());
    Ok(())
}

/// Electronics listing with local deletes and edits.
pub async fn electronics(state: &AppState, args: ElectronicsArgs) -> Result<(), AppError> {
    require_login(state).await?;
    let loaded = Loaded::or_default(state.catalog().electronics_products(args.page, None).await);
    notice_fallback(&loaded);

    let mut listing = Listing::new(loaded.into_data().products);
    remove_all(&mut listing, args.delete.iter().copied().map(ProductId::new));

    if let Some(id) = args.edit {
        let id = ProductId::new(id);
        let updated = listing.update(id, |product| {
            let mut edit = ProductEdit::from_product(product);
            if let Some(title) = &args.title {
                edit.title.clone_from(title);
            }
            if let Some(brand) = &args.brand {
                edit.brand.clone_from(brand);
            }
            if let Some(price) = &args.price {
                edit.price.clone_from(price);
            }
            if let Some(discount) = &args.discount {
                edit.discount.clone_from(discount);
            }
            if let Some(category) = &args.set_category {
                edit.category.clone_from(category);
            }
            edit.apply(product)
        })?;
        if !updated {
            return Err(AppError::NotFound(format!("electronics product {id}")));
        }
        println!("Updated product {id}.");
    }

    for product in filter_electronics(listing.items(), &args.search, args.category.as_deref()) {
        print_electronics_row(product);
    }
    println!("{} product(s) on page {}", listing.len(), args.page);
    Ok(())
}

/// Validate and submit a new electronics product.
pub async fn create_product(state: &AppState, args: CreateProductArgs) -> Result<(), AppError> {
    require_login(state).await?;
    let product = ProductForm {
        title: args.title,
        brand: args.brand,
        model: args.model,
        color: args.color,
        category: args.category,
        discount: args.discount,
    }
    .validate()?;

    let submitted = state.catalog().create_product(&product).await?;
    println!(
        "{}",
        submitted
            .message
            .unwrap_or_else(|| format!("Product \"{}\" created.", product.title))
    );
    Ok(())
}

/// User listing with local deletes.
pub async fn users(state: &AppState, search: &str, delete: &[i64]) -> Result<(), AppError> {
    require_login(state).await?;
    let loaded = Loaded::or_default(state.catalog().users().await);
    notice_fallback(&loaded);

    let mut listing = Listing::new(loaded.into_data());
    remove_all(&mut listing, delete.iter().copied().map(UserId::new));

    for user in search_users(listing.items(), search) {
        print_user_row(user);
    }
    println!("{} user(s)", listing.len());
    Ok(())
}

fn remove_all<T: Identified>(listing: &mut Listing<T>, ids: impl IntoIterator<Item = T::Id>) {
    for id in ids {
        if listing.remove(id).is_some() {
            println!("Deleted {id}.");
        } else {
            eprintln!("No item with ID {id} in this listing.");
        }
    }
}
