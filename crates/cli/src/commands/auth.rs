//! Account commands: login, logout, registration and profile.
//!
//! # Usage
//!
//! ```bash
//! eleegon login -e john@gmail.com -p 'm38rmF$'
//! eleegon register --firstname Ada --lastname Lovelace --username ada \
//!     --email ada@example.com --password secret1 --confirm-password secret1 \
//!     --phone 1-570-236-7033
//! eleegon profile
//! eleegon logout
//! ```

use clap::Args;
use eleegon_core::UserId;
use eleegon_storefront::error::AppError;
use eleegon_storefront::forms::RegistrationForm;
use eleegon_storefront::session::LoginOutcome;
use eleegon_storefront::state::AppState;
use secrecy::SecretString;

use super::require_login;

/// Registration form fields.
#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long, default_value = "")]
    firstname: String,
    #[arg(long, default_value = "")]
    lastname: String,
    #[arg(long, default_value = "")]
    username: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    password: String,
    #[arg(long, default_value = "")]
    confirm_password: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    city: String,
    #[arg(long, default_value = "")]
    street: String,
    #[arg(long, default_value = "")]
    number: String,
    #[arg(long, default_value = "")]
    zipcode: String,
}

impl From<RegisterArgs> for RegistrationForm {
    fn from(args: RegisterArgs) -> Self {
        Self {
            firstname: args.firstname,
            lastname: args.lastname,
            username: args.username,
            email: args.email,
            password: SecretString::from(args.password),
            confirm_password: SecretString::from(args.confirm_password),
            phone: args.phone,
            city: args.city,
            street: args.street,
            number: args.number,
            zipcode: args.zipcode,
        }
    }
}

/// Log in, or report the existing login.
pub async fn login(state: &AppState, email: &str, password: String) -> Result<(), AppError> {
    let password = SecretString::from(password);
    match state.session().login(state.catalog(), email, &password).await? {
        LoginOutcome::LoggedIn(marker) => println!("Logged in as {}.", marker.email),
        LoginOutcome::AlreadyLoggedIn(marker) => {
            println!("Already logged in as {}. Run `eleegon logout` first to switch.", marker.email);
        }
    }
    Ok(())
}

/// Clear the login marker.
pub async fn logout(state: &AppState) -> Result<(), AppError> {
    state.session().logout().await?;
    println!("Logged out.");
    Ok(())
}

/// Validate the form and submit it.
pub async fn register(state: &AppState, args: RegisterArgs) -> Result<(), AppError> {
    let request = RegistrationForm::from(args).validate()?;
    let submitted = state.catalog().register(&request).await?;
    println!(
        "{}",
        submitted
            .message
            .unwrap_or_else(|| "Registration successful.".to_string())
    );
    println!("You can now log in with `eleegon login -e {}`.", request.email);
    Ok(())
}

/// Show a user's profile. Defaults to the logged-in user.
pub async fn profile(state: &AppState, id: Option<i64>) -> Result<(), AppError> {
    let marker = require_login(state).await?;
    let id = id.map_or(marker.id, UserId::new);
    let user = state.catalog().user(id).await?;

    let name = user.name.full();
    if name.is_empty() {
        println!("{}", user.username);
    } else {
        println!("{name} ({})", user.name.initials());
    }
    println!("Username: {}", user.username);
    println!("Email:    {}", user.email);
    if !user.phone.is_empty() {
        println!("Phone:    {}", user.phone);
    }
    let address = user.address.one_line();
    if !address.is_empty() {
        println!("Address:  {address}");
    }
    Ok(())
}
