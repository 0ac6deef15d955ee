mod quote;
mod rates;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use shipquote_engine::{load_rate_card, RateCard};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shipquote-cli")]
#[command(about = "Shipping cost estimates from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Quote a cart stored as JSON.
    Quote {
        /// JSON array of cart lines (`name`, `quantity`, optional `declared_weight`).
        #[arg(long)]
        cart: PathBuf,
        /// pickup, economy or express (legacy: retirada, pac, sedex).
        #[arg(long)]
        mode: String,
        /// Destination postal code; resolved for display when given.
        #[arg(long)]
        postal_code: Option<String>,
        /// YAML rate card; the built-in table is used when absent.
        #[arg(long, env = "SHIPQUOTE_RATE_TABLE_PATH")]
        rate_table: Option<PathBuf>,
        /// Print the quote as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Print the active rate table.
    Rates {
        #[arg(long, env = "SHIPQUOTE_RATE_TABLE_PATH")]
        rate_table: Option<PathBuf>,
    },
    /// Catalog database maintenance.
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Quote {
            cart,
            mode,
            postal_code,
            rate_table,
            json,
        }) => {
            let card = load_card(rate_table.as_deref())?;
            quote::run_quote(&cart, &mode, postal_code.as_deref(), card, json).await?;
        }
        Some(Commands::Rates { rate_table }) => {
            let card = load_card(rate_table.as_deref())?;
            print!("{}", rates::render_rates(&card));
        }
        Some(Commands::Db { command }) => run_db(command).await?,
        None => println!("shipquote-cli: run with --help to list commands"),
    }

    Ok(())
}

fn load_card(path: Option<&Path>) -> anyhow::Result<RateCard> {
    match path {
        Some(path) => Ok(load_rate_card(path)?),
        None => Ok(RateCard::default()),
    }
}

async fn run_db(command: DbCommands) -> anyhow::Result<()> {
    let config = shipquote_core::load_app_config()?;
    let pool = shipquote_db::connect_pool_from_config(&config).await?;
    match command {
        DbCommands::Ping => {
            shipquote_db::health_check(&pool).await?;
            println!("catalog database reachable");
        }
        DbCommands::Migrate => {
            let applied = shipquote_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}
