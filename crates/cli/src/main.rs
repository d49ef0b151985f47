//! Merchant Cart CLI - inspect and edit the persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Add one unit of a product to merchant 4's cart
//! cart-cli add 4 --product '{"id": 12, "name": "Pad Thai", "price": "11.50"}' --merchant-name "Thai Corner"
//!
//! # Products can also be read from a file
//! cart-cli add 4 --product @pad-thai.json
//!
//! # Set an exact quantity (0 or less removes the line)
//! cart-cli set-qty 4 12 3
//!
//! # Show the cart and its total
//! cart-cli show 4
//! cart-cli total 4
//!
//! # Print the order request for checkout
//! cart-cli checkout 4
//! ```
//!
//! # Commands
//!
//! - `add`, `remove`, `set-qty`, `reprice` - Edit lines
//! - `clear`, `clear-all` - Drop one merchant's cart or every cart
//! - `show`, `total`, `merchants`, `checkout` - Read the cart
//!
//! Configuration comes from `CART_*` environment variables (see
//! `merchant_cart::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use merchant_cart::{CartConfig, SharedCart};

mod commands;
mod input;

#[derive(Parser)]
#[command(name = "cart-cli")]
#[command(author, version, about = "Merchant cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one unit of a product to a merchant's cart
    Add {
        /// Merchant id
        merchant: String,

        /// Product JSON, or @path to a file containing it
        #[arg(short, long)]
        product: String,

        /// Merchant display name
        #[arg(short = 'n', long)]
        merchant_name: Option<String>,
    },
    /// Remove a line from a merchant's cart
    Remove {
        /// Merchant id
        merchant: String,
        /// Product id
        product: String,
    },
    /// Set the exact quantity of a line
    #[command(name = "set-qty")]
    SetQty {
        /// Merchant id
        merchant: String,
        /// Product id
        product: String,
        /// New quantity; 0 or less removes the line
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Replace the promotions applied to a line
    Reprice {
        /// Merchant id
        merchant: String,
        /// Product id
        product: String,
        /// JSON array of promotions, or @path to a file containing it
        #[arg(short, long, default_value = "[]")]
        promotions: String,
    },
    /// Drop a merchant's cart
    Clear {
        /// Merchant id
        merchant: String,
    },
    /// Drop every cart
    #[command(name = "clear-all")]
    ClearAll,
    /// Show a merchant's cart
    Show {
        /// Merchant id
        merchant: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a merchant's cart total
    Total {
        /// Merchant id
        merchant: String,
    },
    /// List merchants with a cart
    Merchants,
    /// Print the order request for a merchant's cart
    Checkout {
        /// Merchant id
        merchant: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

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

fn main() {
    let cli = Cli::parse();

    let config = match CartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "merchant_cart=info,cart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: &CartConfig) -> Result<(), Box<dyn std::error::Error>> {
    let cart = SharedCart::open(config.file_storage());

    match cli.command {
        Commands::Add {
            merchant,
            product,
            merchant_name,
        } => commands::lines::add(&cart, &merchant, &product, merchant_name, config)?,
        Commands::Remove { merchant, product } => {
            commands::lines::remove(&cart, &merchant, &product, config)?;
        }
        Commands::SetQty {
            merchant,
            product,
            quantity,
        } => commands::lines::set_quantity(&cart, &merchant, &product, quantity, config)?,
        Commands::Reprice {
            merchant,
            product,
            promotions,
        } => commands::lines::reprice(&cart, &merchant, &product, &promotions, config)?,
        Commands::Clear { merchant } => commands::carts::clear(&cart, &merchant)?,
        Commands::ClearAll => commands::carts::clear_all(&cart)?,
        Commands::Show { merchant, json } => commands::carts::show(&cart, &merchant, json, config)?,
        Commands::Total { merchant } => commands::carts::total(&cart, &merchant, config)?,
        Commands::Merchants => commands::carts::merchants(&cart)?,
        Commands::Checkout { merchant } => commands::carts::checkout(&cart, &merchant)?,
    }
    Ok(())
}
