//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;

use currency_types::{
    Currency, CurrencyCode, CurrencyRepository, ExchangeRate, RateStore, RepoError,
};

use crate::types::{DbCurrency, DbExchangeRate, format_snapshot, map_insert_error};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (idempotent).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let currencies = include_str!("../migrations/0001_create_currencies.sql");
        sqlx::query(currencies)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let rates = include_str!("../migrations/0002_create_exchange_rates.sql");
        sqlx::query(rates)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Currency catalog
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CurrencyRepository for SqliteRepo {
    async fn list_currencies(&self) -> Result<Vec<Currency>, RepoError> {
        let rows: Vec<DbCurrency> = sqlx::query_as(
            r#"SELECT id, code, name, base, created_at FROM currencies ORDER BY rowid"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbCurrency::into_domain).collect()
    }

    async fn find_currency(&self, code: &CurrencyCode) -> Result<Option<Currency>, RepoError> {
        let row: Option<DbCurrency> = sqlx::query_as(
            r#"SELECT id, code, name, base, created_at FROM currencies WHERE code = ?"#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbCurrency::into_domain).transpose()
    }

    async fn currency_exists(&self, code: &CurrencyCode) -> Result<bool, RepoError> {
        let count: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM currencies WHERE code = ?"#)
            .bind(code.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(count.0 > 0)
    }

    async fn insert_currency(&self, currency: Currency) -> Result<Currency, RepoError> {
        sqlx::query(
            r#"INSERT INTO currencies (id, code, name, base, created_at) VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(currency.id.to_string())
        .bind(currency.code.as_str())
        .bind(&currency.name)
        .bind(currency.base.as_str())
        .bind(currency.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &currency.code))?;

        Ok(currency)
    }

    async fn update_currency(&self, currency: Currency) -> Result<Currency, RepoError> {
        let result = sqlx::query(r#"UPDATE currencies SET name = ?, base = ? WHERE code = ?"#)
            .bind(&currency.name)
            .bind(currency.base.as_str())
            .bind(currency.code.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(currency)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate store
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateStore for SqliteRepo {
    async fn find_all_rates(&self) -> Result<Vec<ExchangeRate>, RepoError> {
        let rows: Vec<DbExchangeRate> = sqlx::query_as(
            r#"SELECT id, currency_code, rate, base, snapshot_at FROM exchange_rates"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbExchangeRate::into_domain).collect()
    }

    async fn append_rate(&self, rate: ExchangeRate) -> Result<ExchangeRate, RepoError> {
        sqlx::query(
            r#"INSERT INTO exchange_rates (id, currency_code, rate, base, snapshot_at) VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(rate.id.to_string())
        .bind(rate.currency_code.as_str())
        .bind(rate.rate.to_string())
        .bind(rate.base.as_str())
        .bind(format_snapshot(&rate.timestamp))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(rate)
    }

    async fn find_latest_rate(
        &self,
        code: &CurrencyCode,
    ) -> Result<Option<ExchangeRate>, RepoError> {
        let row: Option<DbExchangeRate> = sqlx::query_as(
            r#"SELECT id, currency_code, rate, base, snapshot_at FROM exchange_rates
               WHERE currency_code = ?
               ORDER BY snapshot_at DESC, rowid DESC
               LIMIT 1"#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbExchangeRate::into_domain).transpose()
    }

    async fn find_rates_between(
        &self,
        code: &CurrencyCode,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<ExchangeRate>, RepoError> {
        let rows: Vec<DbExchangeRate> = sqlx::query_as(
            r#"SELECT id, currency_code, rate, base, snapshot_at FROM exchange_rates
               WHERE currency_code = ? AND snapshot_at BETWEEN ? AND ?
               ORDER BY snapshot_at DESC, rowid DESC"#,
        )
        .bind(code.as_str())
        .bind(format_snapshot(&start))
        .bind(format_snapshot(&end))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbExchangeRate::into_domain).collect()
    }
}
