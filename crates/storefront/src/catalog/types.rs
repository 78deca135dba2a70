//! Wire types for the apparel and electronics catalog APIs.
//!
//! Every field is decoded leniently: the public APIs are inconsistent about
//! types and presence, and a bad field should not hide the rest of a listing.

use eleegon_core::{CartSource, Price, ProductId, UserId};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use crate::cart::NewCartLine;
use crate::lenient;

/// Product review summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Rating {
    /// Average score out of 5.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub rate: Option<Decimal>,
    /// Number of reviews.
    #[serde(default, deserialize_with = "lenient::count")]
    pub count: Option<u32>,
}

/// A product from the apparel catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApparelProduct {
    pub id: ProductId,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::price")]
    pub price: Price,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub rating: Option<Rating>,
}

impl ApparelProduct {
    /// Cart line for `quantity` units. Apparel is never discounted.
    #[must_use]
    pub fn to_cart_line(&self, quantity: u32) -> NewCartLine {
        NewCartLine {
            id: self.id,
            source: CartSource::Apparel,
            title: self.title.clone(),
            image: self.image.clone(),
            category: non_empty(&self.category),
            brand: None,
            description: non_empty(&self.description),
            unit_price: self.price,
            quantity,
        }
    }
}

/// A product from the electronics catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ElectronicsProduct {
    pub id: ProductId,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::price")]
    pub price: Price,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub color: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub category: String,
    /// Discount percentage, if any.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub discount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub popular: bool,
    #[serde(default, rename = "onSale", deserialize_with = "lenient::flag")]
    pub on_sale: bool,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub rating: Option<Rating>,
}

impl ElectronicsProduct {
    /// Returns true if a positive discount applies.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.discount.is_some_and(|d| d > Decimal::ZERO)
    }

    /// Price of one unit after discount.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.discount
            .map_or(self.price, |percent| self.price.discounted(percent))
    }

    /// Cart line for `quantity` units at the discounted price.
    #[must_use]
    pub fn to_cart_line(&self, quantity: u32) -> NewCartLine {
        NewCartLine {
            id: self.id,
            source: CartSource::Electronics,
            title: self.title.clone(),
            image: self.image.clone(),
            category: non_empty(&self.category),
            brand: non_empty(&self.brand),
            description: non_empty(&self.description),
            unit_price: self.unit_price(),
            quantity,
        }
    }
}

/// A user's name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserName {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub firstname: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub lastname: String,
}

impl UserName {
    /// "First Last", skipping blank parts.
    #[must_use]
    pub fn full(&self) -> String {
        [self.firstname.trim(), self.lastname.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Uppercase initials, e.g. "JD".
    #[must_use]
    pub fn initials(&self) -> String {
        [&self.firstname, &self.lastname]
            .into_iter()
            .filter_map(|part| part.trim().chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Latitude/longitude pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub lat: f64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub long: f64,
}

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, deserialize_with = "lenient::text")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub street: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub number: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub zipcode: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub geolocation: Geolocation,
}

impl Address {
    /// "number street, city, zipcode", skipping blank parts.
    #[must_use]
    pub fn one_line(&self) -> String {
        let street = format!("{} {}", self.number.trim(), self.street.trim());
        [street.trim(), self.city.trim(), self.zipcode.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A user record from the electronics API.
///
/// The API echoes passwords in clear text; login compares against it, so it
/// is kept but wrapped in a [`SecretString`] to stay out of logs.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub username: String,
    #[serde(default, deserialize_with = "lenient::secret")]
    pub password: Option<SecretString>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub name: UserName,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub address: Address,
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: String,
}

impl User {
    /// Returns true if `password` equals the stored one.
    #[must_use]
    pub fn password_matches(&self, password: &SecretString) -> bool {
        self.password
            .as_ref()
            .is_some_and(|stored| stored.expose_secret() == password.expose_secret())
    }
}

/// Body of `POST /users`.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub username: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    pub name: UserName,
    pub address: Address,
    pub phone: String,
}

/// Body of `POST /products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub title: String,
    pub brand: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub color: String,
    pub category: String,
    pub discount: Decimal,
}

/// One page of the electronics listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPage {
    pub products: Vec<ElectronicsProduct>,
    /// Total pages reported by the API. Absent metadata means one page.
    pub total_pages: u32,
}

/// Server acknowledgement of a create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Submitted {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub message: Option<String>,
}

/// Electronics API response wrapper: `{status, message?, ...body}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub status: bool,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

/// Apparel API product list; elements that fail to decode are dropped.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub(crate) struct ApparelListing(
    #[serde(deserialize_with = "lenient::vec_skip_invalid")] pub Vec<ApparelProduct>,
);

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsBody {
    #[serde(default, deserialize_with = "lenient::vec_skip_invalid")]
    pub products: Vec<ElectronicsProduct>,
    #[serde(default, rename = "totalPages", deserialize_with = "lenient::count")]
    pub total_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductBody {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub product: Option<ElectronicsProduct>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoriesBody {
    #[serde(default, deserialize_with = "lenient::vec_skip_invalid")]
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersBody {
    #[serde(default, deserialize_with = "lenient::vec_skip_invalid")]
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserBody {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub user: Option<User>,
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
