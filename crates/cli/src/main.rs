//! Orchard CLI - Offline catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # List the products a store page would show
//! orchard catalog list --category iphone --sort price-low --color Black
//!
//! # Show the facet options offered for a category
//! orchard catalog facets macbook
//!
//! # Check a fixture for duplicate ids and non-positive prices
//! orchard catalog validate --catalog crates/storefront/static/products.json
//! ```
//!
//! # Commands
//!
//! - `catalog list` - Run the listing pipeline over a fixture
//! - `catalog facets` - Print capacity, color and model options
//! - `catalog validate` - Report data problems in a fixture

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "orchard")]
#[command(author, version, about = "Orchard CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a catalog fixture
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

/// Location of the catalog fixture.
#[derive(Args)]
struct CatalogSource {
    /// Path to the JSON catalog
    #[arg(
        long,
        env = "STOREFRONT_CATALOG_PATH",
        default_value = "crates/storefront/static/products.json"
    )]
    catalog: PathBuf,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products after category, facet and price filtering
    List {
        #[command(flatten)]
        source: CatalogSource,

        /// Category token (`all`, `macbook`, `iphone`, ...)
        #[arg(long, default_value = "all")]
        category: String,

        /// Sort key (`newest`, `price-low`, `price-high`, `name`)
        #[arg(long, default_value = "newest")]
        sort: String,

        /// Capacity to match (repeatable)
        #[arg(long)]
        capacity: Vec<String>,

        /// Color to match (repeatable)
        #[arg(long)]
        color: Vec<String>,

        /// Model name to match (repeatable)
        #[arg(long)]
        model: Vec<String>,

        /// Minimum price in dollars
        #[arg(long)]
        min_price: Option<i64>,

        /// Maximum price in dollars
        #[arg(long)]
        max_price: Option<i64>,
    },
    /// Show facet options for a category
    Facets {
        #[command(flatten)]
        source: CatalogSource,

        /// Category token
        category: String,
    },
    /// Report duplicate ids and non-positive prices
    Validate {
        #[command(flatten)]
        source: CatalogSource,
    },
}

fn main() {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::catalog::CatalogCommandError> {
    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List {
                source,
                category,
                sort,
                capacity,
                color,
                model,
                min_price,
                max_price,
            } => {
                let filters = commands::catalog::ListFilters {
                    category,
                    sort,
                    capacities: capacity,
                    colors: color,
                    models: model,
                    min_price,
                    max_price,
                };
                commands::catalog::list(&source.catalog, &filters)?;
            }
            CatalogAction::Facets { source, category } => {
                commands::catalog::facets(&source.catalog, &category)?;
            }
            CatalogAction::Validate { source } => {
                commands::catalog::validate(&source.catalog)?;
            }
        },
    }
    Ok(())
}
