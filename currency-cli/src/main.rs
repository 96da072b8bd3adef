//! Currency CLI
//!
//! Command-line interface for the Currency Rates API.

use anyhow::Result;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use currency_client::CurrencyClient;

#[derive(Parser)]
#[command(name = "currency")]
#[command(author, version, about = "Currency Rates API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Currency Rates API
    #[arg(
        long,
        env = "CURRENCY_API_URL",
        default_value = "http://localhost:9090"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Currency catalog operations
    Currency {
        #[command(subcommand)]
        action: CurrencyCommands,
    },
    /// Exchange rate operations
    Rate {
        #[command(subcommand)]
        action: RateCommands,
    },
    /// Convert an amount between two currencies
    Convert {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: Decimal,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum CurrencyCommands {
    /// Add a currency to the catalog
    Create {
        /// Three letter code, e.g. EUR
        code: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Base currency used when requesting rates
        #[arg(long, default_value = "USD")]
        base: String,
    },
    /// Get a currency by code
    Get { code: String },
    /// Update name and base of a currency
    Update {
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "USD")]
        base: String,
    },
    /// List the catalog
    List,
    /// Add currencies the provider knows about
    Sync,
}

#[derive(Subcommand)]
enum RateCommands {
    /// Latest rate for a currency
    Latest { code: String },
    /// Rates within a time window, newest first
    History {
        code: String,
        /// Window start, e.g. 2024-01-01T00:00:00
        #[arg(long)]
        start: NaiveDateTime,
        /// Window end, inclusive
        #[arg(long)]
        end: NaiveDateTime,
    },
    /// Record a rate by hand
    Record {
        code: String,
        #[arg(long)]
        rate: Decimal,
        #[arg(long, default_value = "USD")]
        base: String,
        /// Snapshot time, defaults to now on the server
        #[arg(long)]
        timestamp: Option<NaiveDateTime>,
    },
    /// List every stored rate
    List,
    /// Fetch fresh rates from the provider now
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = CurrencyClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Currency { action } => match action {
            CurrencyCommands::Create { code, name, base } => {
                let currency = client.create_currency(&code, &name, &base).await?;
                println!("{}", serde_json::to_string_pretty(&currency)?);
            }
            CurrencyCommands::Get { code } => {
                let currency = client.get_currency(&code).await?;
                println!("{}", serde_json::to_string_pretty(&currency)?);
            }
            CurrencyCommands::Update { code, name, base } => {
                let currency = client.update_currency(&code, &name, &base).await?;
                println!("{}", serde_json::to_string_pretty(&currency)?);
            }
            CurrencyCommands::List => {
                let currencies = client.list_currencies().await?;
                println!("{}", serde_json::to_string_pretty(&currencies)?);
            }
            CurrencyCommands::Sync => {
                let report = client.sync_catalog().await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        },

        Commands::Rate { action } => match action {
            RateCommands::Latest { code } => {
                let rate = client.latest_rate(&code).await?;
                println!("{}", serde_json::to_string_pretty(&rate)?);
            }
            RateCommands::History { code, start, end } => {
                let rates = client.rate_history(&code, start, end).await?;
                println!("{}", serde_json::to_string_pretty(&rates)?);
            }
            RateCommands::Record {
                code,
                rate,
                base,
                timestamp,
            } => {
                let stored = client.record_rate(&code, rate, &base, timestamp).await?;
                println!("{}", serde_json::to_string_pretty(&stored)?);
            }
            RateCommands::List => {
                let rates = client.list_rates().await?;
                println!("{}", serde_json::to_string_pretty(&rates)?);
            }
            RateCommands::Refresh => {
                let report = client.refresh_rates().await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        },

        Commands::Convert { from, to, amount } => {
            let result = client.convert(&from, &to, amount).await?;
            println!(
                "{} {} = {} {}",
                result.amount, result.from, result.converted, result.to
            );
        }
    }

    Ok(())
}
