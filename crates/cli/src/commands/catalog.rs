//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! eleegon home
//! eleegon products --category jewelery
//! eleegon electronics --page 2 --limit 20 --search tv
//! eleegon categories --apparel
//! eleegon product 7 --electronics
//! ```

use eleegon_core::ProductId;
use eleegon_storefront::catalog::{
    ApparelProduct, ElectronicsProduct, Pager, Today, apparel_categories, filter_apparel,
    filter_electronics,
};
use eleegon_storefront::error::AppError;
use eleegon_storefront::loaded::Loaded;
use eleegon_storefront::state::AppState;

use super::{notice_fallback, require_login};

/// Greeting banner and calendar facts.
pub fn home() {
    let today = Today::now();
    println!("{}", today.greeting);
    println!(
        "Day {} | Week {} | {}",
        today.day_of_year, today.week, today.weekday
    );
}

/// Apparel listing, filtered by category and search text.
pub async fn products(state: &AppState, category: &str, search: &str) -> Result<(), AppError> {
    let loaded = Loaded::or_default(state.catalog().apparel_products().await);
    notice_fallback(&loaded);

    let matches = filter_apparel(loaded.data(), search, category);
    if matches.is_empty() {
        println!("No products found.");
        return Ok(());
    }
    for product in matches {
        print_apparel_row(product);
    }
    Ok(())
}

/// Electronics listing. Shows `page`, or with `all` every page from the
/// first until the server reports no more.
pub async fn electronics(
    state: &AppState,
    page: u32,
    limit: Option<u32>,
    category: Option<&str>,
    search: &str,
    all: bool,
) -> Result<(), AppError> {
    if page == 0 {
        return Err(AppError::BadRequest("page starts at 1".to_string()));
    }

    let mut pager = Pager::new();
    let mut current = if all { pager.page() } else { page };
    let mut shown = 0_usize;
    loop {
        let loaded = Loaded::or_default(state.catalog().electronics_products(current, limit).await);
        notice_fallback(&loaded);
        let listing = loaded.into_data();
        pager.update_total(listing.total_pages);

        for product in filter_electronics(&listing.products, search, category) {
            print_electronics_row(product);
            shown += 1;
        }

        if !all {
            break;
        }
        match pager.next_page() {
            Some(next) => current = next,
            None => break,
        }
    }

    if shown == 0 {
        println!("No products found.");
    }
    println!("Page {current} of {}", pager.total_pages());
    if current < pager.total_pages() {
        println!("Next: eleegon electronics --page {}", current + 1);
    }
    Ok(())
}

/// Category names for either catalog.
pub async fn categories(state: &AppState, apparel: bool) -> Result<(), AppError> {
    let categories = if apparel {
        let loaded = Loaded::or_default(state.catalog().apparel_products().await);
        notice_fallback(&loaded);
        apparel_categories(loaded.data())
    } else {
        let loaded = Loaded::or_default(state.catalog().categories().await);
        notice_fallback(&loaded);
        loaded.into_data()
    };
    for category in categories {
        println!("{category}");
    }
    Ok(())
}

/// Product detail. Requires login.
pub async fn product(state: &AppState, id: i64, electronics: bool) -> Result<(), AppError> {
    require_login(state).await?;
    let id = ProductId::new(id);

    if electronics {
        let product = state.catalog().electronics_product(id).await?;
        println!("{} (#{})", product.title, product.id);
        if !product.brand.is_empty() {
            println!("Brand:    {}", product.brand);
        }
        if !product.model.is_empty() {
            println!("Model:    {}", product.model);
        }
        if !product.color.is_empty() {
            println!("Color:    {}", product.color);
        }
        println!("Category: {}", product.category);
        match product.discount.filter(|_| product.has_discount()) {
            Some(discount) => println!(
                "Price:    {} ({discount}% off {})",
                product.unit_price().display(),
                product.price.display()
            ),
            None => println!("Price:    {}", product.price.display()),
        }
        if product.on_sale {
            println!("On sale");
        }
        print_description(&product.description);
    } else {
        let product = state.catalog().apparel_product(id).await?;
        println!("{} (#{})", product.title, product.id);
        println!("Category: {}", product.category);
        println!("Price:    {}", product.price.display());
        if let Some(rating) = &product.rating {
            if let Some(rate) = rating.rate {
                println!("Rating:   {rate} ({} reviews)", rating.count.unwrap_or(0));
            }
        }
        print_description(&product.description);
    }
    Ok(())
}

pub(super) fn print_apparel_row(product: &ApparelProduct) {
    println!(
        "#{:<4} {:>10}  {}  [{}]",
        product.id.as_i64(),
        product.price.display(),
        product.title,
        product.category
    );
}

pub(super) fn print_electronics_row(product: &ElectronicsProduct) {
    let discount = if product.has_discount() {
        product
            .discount
            .map(|d| format!(" (-{d}%)"))
            .unwrap_or_default()
    } else {
        String::new()
    };
    println!(
        "#{:<4} {:>10}{discount}  {}  [{}]",
        product.id.as_i64(),
        product.unit_price().display(),
        product.title,
        product.category
    );
}

fn print_description(description: &str) {
    if !description.trim().is_empty() {
        println!();
        println!("{}", description.trim());
    }
}
