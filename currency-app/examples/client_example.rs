//! Client example walking through the catalog, rate and conversion flows
//! against a locally started server.
//!
//! Run with: cargo run -p currency-app --example client_example --no-default-features --features sqlite

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::NaiveDate;
use currency_client::CurrencyClient;
use currency_hex::{CurrencyService, OpenExchangeRatesClient, RefreshConfig, inbound::HttpServer};
use currency_repo::build_repo;
use currency_types::RateCache;
use exchange_rates::InMemoryRateCache;
use rust_decimal_macros::dec;
use tempfile::tempdir;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let port = addr.port();
    drop(listener);

    // Use a temp file-backed SQLite DB
    let tmp = tempdir()?;
    let db_path = tmp.path().join("currency.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    println!("🚀 Starting server on port {port}...");
    println!("   Database: {db_url}");

    let repo = Arc::new(build_repo(&db_url).await?);
    let cache: Arc<dyn RateCache> = Arc::new(InMemoryRateCache::new());

    // Nothing listens on the discard port, so provider-driven jobs report skipped groups
    let provider = Arc::new(OpenExchangeRatesClient::new(
        "http://127.0.0.1:9/api",
        Some(std::time::Duration::from_secs(2)),
    )?);

    let service = CurrencyService::new(repo, provider, cache, RefreshConfig::new("demo"));
    let router = HttpServer::new(Arc::new(service)).router();

    let server_addr = format!("127.0.0.1:{port}");
    tokio::spawn(async move {
        axum::serve(
            TcpListener::bind(&server_addr).await.unwrap(),
            router.into_make_service(),
        )
        .await
        .unwrap();
    });

    // Wait for server to start
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    let client = CurrencyClient::new(format!("http://127.0.0.1:{port}"));

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: catalog, rates and conversion
    // ─────────────────────────────────────────────────────────────────────────

    let health = client.health().await?;
    println!("✅ Server health: {health}");

    for (code, name) in [("USD", "US Dollar"), ("EUR", "Euro"), ("JPY", "Yen")] {
        let currency = client.create_currency(code, name, "USD").await?;
        println!("✅ Added {} ({})", currency.code, currency.name);
    }

    let duplicate = client.create_currency("EUR", "Euro", "USD").await;
    println!("✅ Duplicate rejected: {}", duplicate.unwrap_err());

    let jpy = client.update_currency("JPY", "Japanese Yen", "EUR").await?;
    println!("✅ Renamed JPY to {:?}, base {}", jpy.name, jpy.base);

    let day = |d| {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .ok_or_else(|| anyhow::anyhow!("invalid date"))
    };
    client.record_rate("USD", dec!(1), "USD", Some(day(1)?)).await?;
    client.record_rate("EUR", dec!(0.84), "USD", Some(day(1)?)).await?;
    client.record_rate("EUR", dec!(0.85), "USD", Some(day(2)?)).await?;
    println!("✅ Recorded rates");

    let latest = client.latest_rate("EUR").await?;
    println!("   Latest EUR: {} at {}", latest.rate, latest.timestamp);

    let history = client.rate_history("EUR", day(1)?, day(2)?).await?;
    println!("\n📋 EUR history:");
    for rate in history {
        println!("   - {} {}", rate.timestamp, rate.rate);
    }

    let result = client.convert("USD", "EUR", dec!(100)).await?;
    println!(
        "\n✅ {} {} = {} {}",
        result.amount, result.from, result.converted, result.to
    );

    let missing = client.convert("USD", "GBP", dec!(100)).await;
    println!("✅ Missing rate: {}", missing.unwrap_err());

    let report = client.refresh_rates().await?;
    println!(
        "✅ Refresh with provider offline: {} groups, {} skipped",
        report.groups, report.groups_skipped
    );

    println!("\n🎉 Example completed successfully!");

    Ok(())
}
