//! JWT Pizza in the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse without logging in
//! pizza menu
//! pizza franchises --filter Lota
//!
//! # Log in; the token is kept in PIZZA_SESSION_FILE between runs
//! pizza login -e d@jwt.com -p a
//! pizza order --store 2/4 --item 1 --item 2
//! pizza history
//!
//! # Dashboards
//! pizza franchise list
//! pizza admin users --filter Kai
//! ```
//!
//! # Commands
//!
//! - `menu`, `franchises`, `docs` - Public browsing
//! - `login`, `register`, `logout`, `whoami`, `profile`, `nav` - Session
//! - `order`, `history`, `verify` - Ordering
//! - `franchise` - Franchise dashboard
//! - `admin` - Admin dashboard
//!
//! Results go to stdout. Logs go to stderr, filtered by `RUST_LOG`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jwt_pizza_client::{ClientConfig, StoreTarget, Storefront};
use jwt_pizza_core::{FranchiseId, MenuItemId, StoreId, UserId};

mod commands;
mod view;

use commands::CliError;

#[derive(Parser)]
#[command(name = "pizza")]
#[command(author, version, about = "JWT Pizza storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the menu
    Menu,
    /// List franchises and their stores
    Franchises {
        /// Only franchises whose name contains this text
        #[arg(short, long, default_value = "")]
        filter: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Log in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "PIZZA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Register a new diner account
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "PIZZA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show the navigation links available to you
    Nav,
    /// Update your name, email, or password
    Profile {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Order pizzas from a store
    Order {
        /// Store as FRANCHISE/STORE, e.g. 2/4
        #[arg(short, long)]
        store: StoreTarget,
        /// Menu item id; repeat for more pizzas
        #[arg(short, long = "item", required = true)]
        items: Vec<MenuItemId>,
    },
    /// Show your past orders
    History {
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Verify an order token with the pizza factory
    Verify { jwt: String },
    /// Show the service's API documentation
    Docs,
    /// Franchise dashboard
    Franchise {
        #[command(subcommand)]
        action: FranchiseAction,
    },
    /// Admin dashboard
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum FranchiseAction {
    /// Show the franchises you run and their stores
    List,
    /// Open a store
    CreateStore {
        franchise_id: FranchiseId,
        name: String,
    },
    /// Close a store
    CloseStore {
        franchise_id: FranchiseId,
        store_id: StoreId,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List every franchise
    Franchises {
        #[arg(short, long, default_value = "")]
        filter: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Create a franchise
    CreateFranchise {
        name: String,
        /// Franchisee email; repeat for more
        #[arg(short, long = "admin", required = true)]
        admins: Vec<String>,
    },
    /// Close a franchise and all of its stores
    CloseFranchise { franchise_id: FranchiseId },
    /// List users
    Users {
        #[arg(short, long, default_value = "")]
        filter: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Delete a user
    DeleteUser { user_id: UserId },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
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

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "jwt_pizza_client=info,jwt_pizza_cli=info".into())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), CliError> {
    let mut storefront = Storefront::from_config(config)?;
    if let Err(e) = storefront.restore().await {
        tracing::warn!(error = %e, "Could not restore the saved session");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Menu => commands::order::menu(&storefront, &mut out).await?,
        Commands::Franchises { filter, page } => {
            commands::order::franchises(&storefront, &mut out, &filter, page).await?;
        }
        Commands::Login { email, password } => {
            commands::account::login(&mut storefront, &mut out, &email, password.into()).await?;
        }
        Commands::Register {
            name,
            email,
            password,
        } => {
            commands::account::register(&mut storefront, &mut out, &name, &email, password.into())
                .await?;
        }
        Commands::Logout => commands::account::logout(&mut storefront, &mut out).await?,
        Commands::Whoami => commands::account::whoami(&storefront, &mut out)?,
        Commands::Nav => view::navigation(&mut out, &storefront.navigation())?,
        Commands::Profile {
            name,
            email,
            password,
        } => {
            let password = password.map(SecretString::from);
            commands::account::profile(&mut storefront, &mut out, name, email, password).await?;
        }
        Commands::Order { store, items } => {
            commands::order::order(&mut storefront, &mut out, store, &items).await?;
        }
        Commands::History { page } => {
            commands::order::history(&storefront, &mut out, page).await?;
        }
        Commands::Verify { jwt } => commands::order::verify(&storefront, &mut out, &jwt).await?,
        Commands::Docs => commands::order::docs(&storefront, &mut out).await?,
        Commands::Franchise { action } => match action {
            FranchiseAction::List => commands::franchise::list(&storefront, &mut out).await?,
            FranchiseAction::CreateStore { franchise_id, name } => {
                commands::franchise::create_store(&storefront, &mut out, franchise_id, &name)
                    .await?;
            }
            FranchiseAction::CloseStore {
                franchise_id,
                store_id,
            } => {
                commands::franchise::close_store(&storefront, &mut out, franchise_id, store_id)
                    .await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Franchises { filter, page } => {
                commands::admin::franchises(&storefront, &mut out, &filter, page).await?;
            }
            AdminAction::CreateFranchise { name, admins } => {
                commands::admin::create_franchise(&storefront, &mut out, &name, &admins).await?;
            }
            AdminAction::CloseFranchise { franchise_id } => {
                commands::admin::close_franchise(&storefront, &mut out, franchise_id).await?;
            }
            AdminAction::Users { filter, page } => {
                commands::admin::users(&storefront, &mut out, &filter, page).await?;
            }
            AdminAction::DeleteUser { user_id } => {
                commands::admin::delete_user(&storefront, &mut out, user_id).await?;
            }
        },
    }

    out.flush()?;
    Ok(())
}
