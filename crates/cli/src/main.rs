//! Vitrina CLI - migrations, tenant management and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply the database migrations
//! vitrina-cli migrate
//!
//! # List and create tenants
//! vitrina-cli tenant list
//! vitrina-cli tenant create -s herramientas-sur -n "Herramientas Sur" -o <owner-uuid>
//!
//! # Search a catalog file offline
//! vitrina-cli catalog search productos.json -q "taladro makita" --sort price-asc
//!
//! # Import a catalog file into a tenant (upsert by product code)
//! vitrina-cli catalog import productos.yaml -t herramientas-sur
//!
//! # Hash a demo account password (reads stdin when no argument is given)
//! vitrina-cli hash-password
//! ```
//!
//! # Commands
//!
//! - `migrate` - Apply the SQL migrations to the hosted database
//! - `tenant` - List and create tenants
//! - `catalog` - Offline search and bulk import
//! - `hash-password` - Argon2 hash for the admin demo accounts file

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use vitrina_core::search::SortKey;
use vitrina_core::{Plan, UserId};

mod commands;

#[derive(Parser)]
#[command(name = "vitrina-cli")]
#[command(author, version, about = "Vitrina CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Manage tenants
    Tenant {
        #[command(subcommand)]
        action: TenantAction,
    },
    /// Catalog tools
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Hash a password for the admin demo accounts file
    HashPassword {
        /// Password to hash; read from stdin when omitted
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum TenantAction {
    /// List every tenant
    List,
    /// Create a tenant with default configuration
    Create {
        /// URL slug (lowercase letters, digits and hyphens)
        #[arg(short, long)]
        slug: String,

        /// Store display name
        #[arg(short, long)]
        name: String,

        /// Owner's user id
        #[arg(short, long)]
        owner: UserId,

        /// Plan (`starter`, `professional`, `enterprise`)
        #[arg(short, long, default_value = "starter")]
        plan: Plan,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Search a product file with the storefront's search pipeline
    Search {
        /// JSON or YAML product list
        file: PathBuf,

        /// Free-text query
        #[arg(short, long)]
        query: Option<String>,

        /// Category tag filter (repeatable)
        #[arg(short, long)]
        category: Vec<String>,

        /// Brand tag filter (repeatable)
        #[arg(short, long)]
        brand: Vec<String>,

        /// Only products with stock
        #[arg(long)]
        in_stock: bool,

        /// Only discounted products
        #[arg(long)]
        discount_only: bool,

        /// Sort order (relevance, price-asc, price-desc, name-asc,
        /// name-desc, discount-desc, condition-best)
        #[arg(long, default_value = "relevance")]
        sort: SortKey,

        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = 12)]
        page_size: usize,
    },
    /// Upsert a product file into a tenant's catalog
    Import {
        /// JSON or YAML product list
        file: PathBuf,

        /// Tenant slug or id
        #[arg(short, long)]
        tenant: String,

        /// Validate and report without writing
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Tenant { action } => match action {
            TenantAction::List => commands::tenant::list().await?,
            TenantAction::Create {
                slug,
                name,
                owner,
                plan,
            } => {
                commands::tenant::create(&slug, &name, owner, plan).await?;
            }
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Search {
                file,
                query,
                category,
                brand,
                in_stock,
                discount_only,
                sort,
                page,
                page_size,
            } => {
                let filter = vitrina_core::search::FilterState {
                    categories: category,
                    brands: brand,
                    in_stock,
                    discount_only,
                    query,
                    ..Default::default()
                };
                commands::catalog::search(&file, &filter, sort, page, page_size)?;
            }
            CatalogAction::Import {
                file,
                tenant,
                dry_run,
            } => {
                commands::catalog::import(&file, &tenant, dry_run).await?;
            }
        },
        Commands::HashPassword { password } => commands::password::hash(password)?,
    }
    Ok(())
}
