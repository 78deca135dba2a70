//! Listing helpers: categories, search filters, pagination and the home
//! screen greeting.

use chrono::{Datelike, NaiveDateTime, Timelike};

use super::types::{ApparelProduct, ElectronicsProduct, User};

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// `"all"` followed by each distinct apparel category in first-seen order.
#[must_use]
pub fn apparel_categories(products: &[ApparelProduct]) -> Vec<String> {
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for product in products {
        if !product.category.is_empty() && !categories.contains(&product.category) {
            categories.push(product.category.clone());
        }
    }
    categories
}

/// Apparel products matching a free-text query and a category.
///
/// The query matches title, description or category, case-insensitively. A
/// blank query matches everything; so does the category `"all"`.
#[must_use]
pub fn filter_apparel<'a>(
    products: &'a [ApparelProduct],
    query: &str,
    category: &str,
) -> Vec<&'a ApparelProduct> {
    let query = query.trim().to_lowercase();
    products
        .iter()
        .filter(|p| category == ALL_CATEGORIES || p.category == category)
        .filter(|p| {
            query.is_empty()
                || contains_folded(&p.title, &query)
                || contains_folded(&p.description, &query)
                || contains_folded(&p.category, &query)
        })
        .collect()
}

/// Electronics products whose title matches `query`, optionally within a
/// category.
#[must_use]
pub fn filter_electronics<'a>(
    products: &'a [ElectronicsProduct],
    query: &str,
    category: Option<&str>,
) -> Vec<&'a ElectronicsProduct> {
    let query = query.trim().to_lowercase();
    products
        .iter()
        .filter(|p| category.is_none_or(|c| p.category == c))
        .filter(|p| query.is_empty() || contains_folded(&p.title, &query))
        .collect()
}

/// Users whose first name, last name or email contains `query`.
#[must_use]
pub fn search_users<'a>(users: &'a [User], query: &str) -> Vec<&'a User> {
    let query = query.trim().to_lowercase();
    users
        .iter()
        .filter(|u| {
            query.is_empty()
                || contains_folded(&u.name.firstname, &query)
                || contains_folded(&u.name.lastname, &query)
                || contains_folded(&u.email, &query)
        })
        .collect()
}

fn contains_folded(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

/// Page cursor for incrementally loaded listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: u32,
    total_pages: u32,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 1,
        }
    }
}

impl Pager {
    /// Start at page 1 of 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current page, starting at 1.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Total pages last reported by the server.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Returns true if another page can be loaded.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.page < self.total_pages
    }

    /// Record the page count reported with the latest response.
    pub fn update_total(&mut self, total_pages: u32) {
        self.total_pages = total_pages.max(1);
    }

    /// Advance to the next page, if any. Returns the new page number.
    pub fn next_page(&mut self) -> Option<u32> {
        if self.has_more() {
            self.page += 1;
            Some(self.page)
        } else {
            None
        }
    }

    /// Back to page 1 (pull-to-refresh).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Time-of-day greeting shown on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greeting {
    Morning,
    Afternoon,
    Evening,
}

impl Greeting {
    /// Greeting for an hour of the day (0-23).
    #[must_use]
    pub const fn for_hour(hour: u32) -> Self {
        if hour < 12 {
            Self::Morning
        } else if hour < 18 {
            Self::Afternoon
        } else {
            Self::Evening
        }
    }

    /// Banner text, e.g. "GOOD MORNING".
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Morning => "GOOD MORNING",
            Self::Afternoon => "GOOD AFTERNOON",
            Self::Evening => "GOOD EVENING",
        }
    }
}

impl std::fmt::Display for Greeting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Calendar facts shown under the greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Today {
    pub greeting: Greeting,
    /// Day of the year, starting at 1.
    pub day_of_year: u32,
    /// ISO week number.
    pub week: u32,
    /// Weekday name, e.g. "Mon".
    pub weekday: chrono::Weekday,
}

impl Today {
    /// Facts for a local date and time.
    #[must_use]
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            greeting: Greeting::for_hour(now.hour()),
            day_of_year: now.ordinal(),
            week: now.iso_week().week(),
            weekday: now.weekday(),
        }
    }

    /// Facts for the current local time.
    #[must_use]
    pub fn now() -> Self {
        Self::at(chrono::Local::now().naive_local())
    }
}
