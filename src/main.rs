//! CLI for formrelay
//!
//! Subcommands:
//! - `serve`: run the relay and the HTTP ingress side by side
//! - `relay`: run only the TCP relay
//! - `ingress`: run only the HTTP ingress
//! - `messages`: print stored messages as JSON lines

use std::error::Error;

use clap::{Parser, Subcommand};
use formrelay::app::{run_services, start_ingress, start_relay};
use formrelay::config::{Settings, load_config};
use formrelay::ingress;
use formrelay::persistence::Connector;
use formrelay::utils::logging;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "formrelay", version)]
struct Cli {
    /// Configuration file, without extension
    #[arg(long, global = true)]
    config: Option<String>,

    /// Overrides the configured datastore uri (mongodb://... or sled://<path>)
    #[arg(long, global = true)]
    datastore_uri: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the relay and the HTTP ingress
    Serve,
    /// Start only the TCP relay
    Relay,
    /// Start only the HTTP ingress
    Ingress,
    /// Print every stored message
    Messages,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings = match load_config(cli.config.as_deref()) {
        Ok(mut settings) => {
            if let Some(uri) = cli.datastore_uri {
                settings.datastore.uri = uri;
            }
            settings
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    logging::init(&settings.log.level);

    let result = match cli.command {
        Command::Serve => run_all(settings).await,
        Command::Relay => run_relay(settings).await,
        Command::Ingress => run_ingress(settings).await,
        Command::Messages => print_messages(settings).await,
    };

    if let Err(e) = result {
        error!("formrelay failed: {}", e);
        std::process::exit(1);
    }
}

async fn run_all(settings: Settings) -> Result<(), Box<dyn Error>> {
    let relay = start_relay(&settings).await?;
    let (listener, state) = start_ingress(&settings).await?;

    run_services(
        relay.run(),
        ingress::serve(listener, state, std::future::pending::<()>()),
        shutdown_signal(),
    )
    .await?;

    Ok(())
}

async fn run_relay(settings: Settings) -> Result<(), Box<dyn Error>> {
    let relay = start_relay(&settings).await?;
    relay.run_until(shutdown_signal()).await;
    Ok(())
}

async fn run_ingress(settings: Settings) -> Result<(), Box<dyn Error>> {
    let (listener, state) = start_ingress(&settings).await?;
    ingress::serve(listener, state, shutdown_signal()).await?;
    Ok(())
}

async fn print_messages(settings: Settings) -> Result<(), Box<dyn Error>> {
    let connector = Connector::from_settings(&settings.datastore)?;
    let store = connector.get().await?;

    for record in store.load_all().await? {
        println!("{}", serde_json::to_string(&record)?);
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received. Exiting gracefully.");
}
