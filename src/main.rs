use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

mod config;
mod food;
mod lifecycle;
mod logging;
mod notify;
mod sweep;
#[cfg(test)]
mod test_utils;
mod users;

use crate::food::{FoodStatus, SqliteFoodStore};
use crate::lifecycle::{ClaimRequest, FoodInput, LifecycleEngine};
use crate::notify::{templates, HttpMailer, LogNotifier, Notifier};
use crate::sweep::CleanupSweeper;
use crate::users::{SqliteUserDirectory, UserContact, UserDirectory};

type Engine = LifecycleEngine<SqliteFoodStore, SqliteUserDirectory, Arc<dyn Notifier>>;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.toml",
        global = true
    )]
    config: String,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Listing fields as a client form would send them
#[derive(Args, Debug)]
struct ListingArgs {
    /// Name of the food
    #[arg(long)]
    name: String,

    /// Number of portions, at least 1
    #[arg(long)]
    quantity: String,

    /// Expiry as RFC 3339, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD` (UTC)
    #[arg(long)]
    expiry: String,

    #[arg(long)]
    description: Option<String>,

    /// JSON object with street, city and pincode
    #[arg(long)]
    address: String,

    /// JSON object with lat and lng
    #[arg(long)]
    location: String,

    /// Image reference stored with the listing
    #[arg(long)]
    image: Option<String>,
}

impl ListingArgs {
    fn split(self) -> (FoodInput, Option<String>) {
        let input = FoodInput {
            food_name: Some(self.name),
            quantity: Some(self.quantity),
            expiry: Some(self.expiry),
            description: self.description,
            address: Some(self.address),
            location: Some(self.location),
        };
        (input, self.image)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the cleanup sweeper until interrupted
    Run,
    /// Run a single cleanup pass
    Sweep,
    /// List a new donation
    Create {
        /// Donor user ID
        #[arg(long)]
        donor: Uuid,

        #[command(flatten)]
        listing: ListingArgs,
    },
    /// Replace the descriptive fields of a listing
    Update {
        id: Uuid,

        #[command(flatten)]
        listing: ListingArgs,
    },
    /// Claim an available listing
    Claim {
        id: Uuid,

        /// Requester user ID
        #[arg(long)]
        requester: Uuid,

        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,
    },
    /// Drop a claim and make the listing available again
    Cancel { id: Uuid },
    /// Record that the food was collected
    Pickup { id: Uuid },
    /// Remove a listing
    Delete { id: Uuid },
    /// List listings, newest first
    List {
        /// Only listings from this donor
        #[arg(long)]
        donor: Option<Uuid>,

        /// Only listings in this status
        #[arg(long)]
        status: Option<FoodStatus>,
    },
    /// Register a user so donors can be notified
    AddUser {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: Option<String>,
    },
    /// Send a test message through the configured relay
    TestEmail {
        /// Recipient, defaults to the admin address
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match config::load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            process::exit(1);
        }
    };

    let _log_guard = logging::init_logging(config.logging.as_ref(), cli.verbose)?;
    info!("Foodshare lifecycle v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration from: {}", cli.config);

    if let Err(e) = execute(cli.command, config).await {
        error!("{e:#}");
        process::exit(1);
    }
    Ok(())
}

async fn execute(command: Commands, config: config::Config) -> Result<()> {
    match command {
        Commands::Run => {
            let sweeper = CleanupSweeper::new(open_store(&config)?, &config.sweep);
            sweeper
                .run(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for shutdown signal: {e}");
                    }
                })
                .await;
            info!("Sweeper stopped");
        }
        Commands::Sweep => {
            let sweeper = CleanupSweeper::new(open_store(&config)?, &config.sweep);
            print_json(&sweeper.sweep().await)?;
        }
        Commands::Create { donor, listing } => {
            let (input, image) = listing.split();
            let details = input.parse()?;
            let record = initialize_engine(&config)?
                .create(donor, details, image)
                .await?;
            print_json(&record)?;
        }
        Commands::Update { id, listing } => {
            let (input, image) = listing.split();
            let details = input.parse()?;
            let record = initialize_engine(&config)?
                .update(id, details, image)
                .await?;
            print_json(&record)?;
        }
        Commands::Claim {
            id,
            requester,
            name,
            phone,
        } => {
            let request = ClaimRequest {
                requester_id: requester,
                requester_name: name,
                requester_phone: phone,
            };
            let record = initialize_engine(&config)?.claim(id, request).await?;
            print_json(&record)?;
        }
        Commands::Cancel { id } => {
            print_json(&initialize_engine(&config)?.cancel(id).await?)?;
        }
        Commands::Pickup { id } => {
            print_json(&initialize_engine(&config)?.mark_picked_up(id).await?)?;
        }
        Commands::Delete { id } => {
            initialize_engine(&config)?.delete(id).await?;
            info!("Food {id} removed");
        }
        Commands::List { donor, status } => {
            let engine = initialize_engine(&config)?;
            let records = match (donor, status) {
                (Some(donor), status) => {
                    let mut records = engine.list_by_donor(donor).await?;
                    if let Some(status) = status {
                        records.retain(|record| record.status == status);
                    }
                    records
                }
                (None, Some(status)) => engine.list_by_status(status).await?,
                (None, None) => engine.list().await?,
            };
            print_json(&records)?;
        }
        Commands::AddUser { name, email } => {
            let users = SqliteUserDirectory::new(&config.database.path)?;
            let user = UserContact::new(name, email);
            users.add_user(user.clone()).await?;
            print_json(&user)?;
        }
        Commands::TestEmail { to } => {
            let to = to.unwrap_or_else(|| config.notify.admin_email.clone());
            let message = templates::test_message();
            build_notifier(&config)?
                .send(&to, &message.subject, &message.body)
                .await
                .with_context(|| format!("Failed to send test email to {to}"))?;
            info!("Test email sent to: {to}");
        }
    }
    Ok(())
}

fn open_store(config: &config::Config) -> Result<Arc<SqliteFoodStore>> {
    let store = SqliteFoodStore::new(&config.database.path)
        .with_context(|| format!("Failed to open food store at {}", config.database.path))?;
    Ok(Arc::new(store))
}

/// Relay-backed notifier when an endpoint is configured, log-only otherwise
fn build_notifier(config: &config::Config) -> Result<Arc<dyn Notifier>> {
    if config.notify.endpoint.is_some() {
        let mailer = HttpMailer::new(&config.notify).context("Failed to build mail relay client")?;
        Ok(Arc::new(mailer))
    } else {
        info!("No mail relay configured; notifications will only be logged");
        Ok(Arc::new(LogNotifier))
    }
}

fn initialize_engine(config: &config::Config) -> Result<Engine> {
    let store = open_store(config)?;
    let users = SqliteUserDirectory::new(&config.database.path)
        .with_context(|| format!("Failed to open user directory at {}", config.database.path))?;
    let notifier = build_notifier(config)?;

    Ok(LifecycleEngine::new(
        store,
        Arc::new(users),
        Arc::new(notifier),
        &config.notify,
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
