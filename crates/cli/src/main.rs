//! Larek CLI - Drive a headless storefront session against the backend.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog
//! larek catalog
//!
//! # Place an order for two products
//! larek checkout \
//!     --item 854cef69-976d-4c2a-a18c-2aa45046c390 \
//!     --item c101ab44-ed99-4a54-990d-47aa2bb4e7d9 \
//!     --payment card --address "Moscow, Tverskaya 1" \
//!     --email buyer@example.com --phone "+7 900 000 00 00"
//!
//! # Dump the rendered page after the catalog loads
//! larek render
//! ```
//!
//! # Commands
//!
//! - `catalog` - Fetch and list products
//! - `checkout` - Walk the basket and both checkout steps, then submit
//! - `render` - Print the page markup

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use larek_core::PaymentMethod;
use larek_storefront::config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "larek")]
#[command(author, version, about = "Larek storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the catalog
    Catalog,
    /// Place an order
    Checkout {
        /// Product id to put in the basket (repeatable)
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,

        /// Payment method (`card`, `cash`)
        #[arg(long)]
        payment: PaymentMethod,

        /// Delivery address
        #[arg(short, long)]
        address: String,

        /// Contact email
        #[arg(short, long)]
        email: String,

        /// Contact phone number
        #[arg(short, long)]
        phone: String,
    },
    /// Print the rendered page
    Render,
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

#[allow(clippy::print_stderr)]
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "larek_storefront=info,larek=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let local = tokio::task::LocalSet::new();
    let result = local.run_until(run(cli, config)).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Catalog => commands::catalog::list(&config).await?,
        Commands::Checkout {
            items,
            payment,
            address,
            email,
            phone,
        } => {
            let order = commands::checkout::CheckoutArgs {
                items,
                payment,
                address,
                email,
                phone,
            };
            commands::checkout::place(&config, &order).await?;
        }
        Commands::Render => commands::render::page(&config).await?,
    }
    Ok(())
}
