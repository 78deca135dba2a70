//! Eleegon CLI - browse the catalogs, keep a cart, manage the store.
//!
//! # Usage
//!
//! ```bash
//! # Log in (cart, profile, users and admin commands require it)
//! eleegon login -e john@gmail.com -p 'm38rmF$'
//!
//! # Browse
//! eleegon products --category "men's clothing" --search jacket
//! eleegon electronics --page 2 --search sony
//!
//! # Cart
//! eleegon cart add 3
//! eleegon cart add 12 --electronics --quantity 2
//! eleegon cart set-quantity 12 --electronics 0 --yes
//! eleegon cart list
//! ```
//!
//! # Commands
//!
//! - `home` - Greeting and today's date facts
//! - `products`, `electronics`, `categories`, `product` - Browse catalogs
//! - `cart` - List, add, remove, change quantity, total
//! - `login`, `logout`, `register`, `profile` - Account
//! - `users` - User directory
//! - `admin` - Product and user listings, product creation

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eleegon_storefront::config::StorefrontConfig;
use eleegon_storefront::error::AppError;
use eleegon_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "eleegon")]
#[command(author, version, about = "Eleegon storefront")]
struct Cli {
    /// Directory for the cart and login marker (overrides `ELEEGON_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the greeting and today's date facts
    Home,
    /// List apparel products
    Products {
        /// Only this category ("all" for every category)
        #[arg(short, long, default_value = "all")]
        category: String,
        /// Match title, description or category
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// List electronics products, one page at a time
    Electronics {
        /// Page to show
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Products per page (default from `ELEEGON_PAGE_LIMIT`)
        #[arg(long)]
        limit: Option<u32>,
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
        /// Match title
        #[arg(short, long, default_value = "")]
        search: String,
        /// Fetch every page, starting from the first
        #[arg(long, conflicts_with = "page")]
        all: bool,
    },
    /// List categories
    Categories {
        /// Apparel categories instead of electronics
        #[arg(long)]
        apparel: bool,
    },
    /// Show one product
    Product {
        /// Product ID
        id: i64,
        /// Look up in the electronics catalog
        #[arg(short, long)]
        electronics: bool,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Log in with email and password
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,
        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Log out
    Logout,
    /// Create an account
    Register(Box<commands::auth::RegisterArgs>),
    /// Show a user profile (defaults to the logged-in user)
    Profile {
        /// User ID
        #[arg(long)]
        id: Option<i64>,
    },
    /// List users
    Users {
        /// Match first name, last name or email
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Store administration
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart entries
    List,
    /// Add a product
    Add {
        /// Product ID
        id: i64,
        /// Product is from the electronics catalog
        #[arg(short, long)]
        electronics: bool,
        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove an entry
    Remove {
        /// Product ID
        id: i64,
        /// Entry is from the electronics catalog
        #[arg(short, long)]
        electronics: bool,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Change the quantity of an entry (below 1 removes it after confirmation)
    SetQuantity {
        /// Product ID
        id: i64,
        /// New quantity
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
        /// Entry is from the electronics catalog
        #[arg(short, long)]
        electronics: bool,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the cart total
    Total,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Apparel listing, with local deletes
    Products {
        /// Only this category ("all" for every category)
        #[arg(short, long, default_value = "all")]
        category: String,
        /// Match title, description or category
        #[arg(short, long, default_value = "")]
        search: String,
        /// Remove these IDs from the listing
        #[arg(long, value_delimiter = ',')]
        delete: Vec<i64>,
    },
    /// Electronics listing, with local edits and deletes
    Electronics(Box<commands::admin::ElectronicsArgs>),
    /// Create an electronics product
    CreateProduct(commands::admin::CreateProductArgs),
    /// User listing, with local deletes
    Users {
        /// Match first name, last name or email
        #[arg(short, long, default_value = "")]
        search: String,
        /// Remove these IDs from the listing
        #[arg(long, value_delimiter = ',')]
        delete: Vec<i64>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "eleegon_storefront=warn,eleegon_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli.command, config).await {
        e.report();
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: StorefrontConfig) -> Result<(), AppError> {
    let state = AppState::new(config)?;

    match command {
        Commands::Home => commands::catalog::home(),
        Commands::Products { category, search } => {
            commands::catalog::products(&state, &category, &search).await?;
        }
        Commands::Electronics {
            page,
            limit,
            category,
            search,
            all,
        } => {
            commands::catalog::electronics(
                &state,
                page,
                limit,
                category.as_deref(),
                &search,
                all,
            )
            .await?;
        }
        Commands::Categories { apparel } => commands::catalog::categories(&state, apparel).await?,
        Commands::Product { id, electronics } => {
            commands::catalog::product(&state, id, electronics).await?;
        }
        Commands::Cart { action } => match action {
            CartAction::List => commands::cart::list(&state).await?,
            CartAction::Add {
                id,
                electronics,
                quantity,
            } => commands::cart::add(&state, id, electronics, quantity).await?,
            CartAction::Remove {
                id,
                electronics,
                yes,
            } => commands::cart::remove(&state, id, electronics, yes).await?,
            CartAction::SetQuantity {
                id,
                quantity,
                electronics,
                yes,
            } => commands::cart::set_quantity(&state, id, electronics, quantity, yes).await?,
            CartAction::Total => commands::cart::total(&state).await?,
        },
        Commands::Login { email, password } => {
            commands::auth::login(&state, &email, password).await?;
        }
        Commands::Logout => commands::auth::logout(&state).await?,
        Commands::Register(args) => commands::auth::register(&state, *args).await?,
        Commands::Profile { id } => commands::auth::profile(&state, id).await?,
        Commands::Users { search } => commands::users::list(&state, &search).await?,
        Commands::Admin { action } => match action {
            AdminAction::Products {
                category,
                search,
                delete,
            } => commands::admin::products(&state, &category, &search, &delete).await?,
            AdminAction::Electronics(args) => commands::admin::electronics(&state, *args).await?,
            AdminAction::CreateProduct(args) => {
                commands::admin::create_product(&state, args).await?;
            }
            AdminAction::Users { search, delete } => {
                commands::admin::users(&state, &search, &delete).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_quantity_parses() {
        let cli = Cli::try_parse_from(["eleegon", "cart", "set-quantity", "3", "-1", "--yes"])
            .map_err(|e| e.to_string());
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cart {
                action: CartAction::SetQuantity {
                    id: 3,
                    quantity: -1,
                    yes: true,
                    ..
                }
            })
        ));
    }

    #[test]
    fn test_admin_delete_list() {
        let cli = Cli::try_parse_from(["eleegon", "admin", "users", "--delete", "1,4"])
            .map_err(|e| e.to_string());
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Admin {
                action: AdminAction::Users { ref delete, .. }
            }) if delete == &[1, 4]
        ));
    }
}
