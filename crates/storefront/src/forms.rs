//! Registration and product-creation forms.
//!
//! Forms hold raw user input. `validate` checks every field, collects one
//! message per failing field, and only then builds the request body, so
//! nothing is sent while any field is invalid.

use std::collections::BTreeMap;
use std::fmt;

use eleegon_core::Email;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};

use crate::catalog::{Address, Geolocation, NewProduct, RegistrationRequest, UserName};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Coordinates sent with every registration.
const DEFAULT_COORDINATE: f64 = 77.777_77;

/// Discount sent when the product form leaves it blank.
const DEFAULT_DISCOUNT: Decimal = Decimal::ONE;

/// Per-field validation messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    /// No errors yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns true if every field passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    fn require(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Account registration input.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub phone: String,
    pub city: String,
    pub street: String,
    pub number: String,
    pub zipcode: String,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            firstname: String::new(),
            lastname: String::new(),
            username: String::new(),
            email: String::new(),
            password: SecretString::from(String::new()),
            confirm_password: SecretString::from(String::new()),
            phone: String::new(),
            city: String::new(),
            street: String::new(),
            number: String::new(),
            zipcode: String::new(),
        }
    }
}

impl RegistrationForm {
    /// Validate every field and build the `POST /users` body.
    ///
    /// # Errors
    ///
    /// Returns all field failures at once.
    pub fn validate(&self) -> Result<RegistrationRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require("firstname", &self.firstname, "First name is required");
        errors.require("lastname", &self.lastname, "Last name is required");
        errors.require("username", &self.username, "Username is required");

        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if Email::parse(&self.email).is_err() {
            errors.add("email", "Email is invalid");
        }

        let password = self.password.expose_secret();
        if password.is_empty() {
            errors.add("password", "Password is required");
        } else if password.chars().count() < MIN_PASSWORD_CHARS {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_CHARS} characters"),
            );
        }
        if password != self.confirm_password.expose_secret() {
            errors.add("confirm_password", "Passwords do not match");
        }

        errors.require("phone", &self.phone, "Phone number is required");

        errors.into_result(|| RegistrationRequest {
            email: self.email.trim().to_owned(),
            username: self.username.trim().to_owned(),
            password: self.password.clone(),
            name: UserName {
                firstname: self.firstname.trim().to_owned(),
                lastname: self.lastname.trim().to_owned(),
            },
            address: Address {
                city: self.city.trim().to_owned(),
                street: self.street.trim().to_owned(),
                number: self.number.trim().to_owned(),
                zipcode: self.zipcode.trim().to_owned(),
                geolocation: Geolocation {
                    lat: DEFAULT_COORDINATE,
                    long: DEFAULT_COORDINATE,
                },
            },
            phone: self.phone.trim().to_owned(),
        })
    }
}

/// New product input for the admin "add product" view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub title: String,
    pub brand: String,
    pub model: String,
    pub color: String,
    pub category: String,
    /// Discount percentage as typed; blank means the default of 1.
    pub discount: String,
}

impl ProductForm {
    /// Validate and build the `POST /products` body from the form values.
    ///
    /// # Errors
    ///
    /// Returns all field failures at once.
    pub fn validate(&self) -> Result<NewProduct, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require("title", &self.title, "Title is required");
        errors.require("brand", &self.brand, "Brand is required");
        errors.require("category", &self.category, "Category is required");

        let discount = match self.discount.trim() {
            "" => DEFAULT_DISCOUNT,
            raw => match raw.parse::<Decimal>() {
                Ok(d) if (Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&d) => d,
                Ok(_) => {
                    errors.add("discount", "Discount must be between 0 and 100");
                    DEFAULT_DISCOUNT
                }
                Err(_) => {
                    errors.add("discount", "Discount must be a number");
                    DEFAULT_DISCOUNT
                }
            },
        };

        errors.into_result(|| NewProduct {
            title: self.title.trim().to_owned(),
            brand: self.brand.trim().to_owned(),
            model: self.model.trim().to_owned(),
            color: self.color.trim().to_owned(),
            category: self.category.trim().to_owned(),
            discount,
        })
    }
}
