//! Orchard CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! orchard migrate
//!
//! # Create a principal (password read from ORCHARD_ADMIN_PASSWORD)
//! orchard admin create -e admin@example.com -n "Admin Name" -r super-admin
//!
//! # List principals
//! orchard admin list
//!
//! # Ensure a super admin exists and load demo content
//! orchard seed --file crates/cli/fixtures/demo.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `ORCHARD_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ORCHARD_ADMIN_PASSWORD` - Password for `admin create` and `seed`
//! - `ORCHARD_ADMIN_EMAIL` - Email of the seeded super admin (default: admin@example.com)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "orchard")]
#[command(author, version, about = "Orchard CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage principals
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Ensure a super admin exists and optionally load demo content
    Seed {
        /// YAML file with products and blog posts
        #[arg(short, long)]
        file: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new principal
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`super-admin`, `admin`, `manager`, `user`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
    /// List all principals
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { email, name, role } => {
                commands::admin::create(&email, &name, &role).await?;
            }
            AdminAction::List => commands::admin::list().await?,
        },
        Commands::Seed { file } => commands::seed::run(file.as_deref()).await?,
    }
    Ok(())
}
