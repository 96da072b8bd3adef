//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

use currency_types::{
    Currency, CurrencyCode, CurrencyRepository, ExchangeRate, RateStore, RepoError,
};

use crate::types::{DbCurrency, DbExchangeRate, map_insert_error};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository implementation.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_currencies_pg.sql"),
        "0001",
    )
    .await?;

    execute_migration(
        pool,
        include_str!("../migrations/0002_create_exchange_rates_pg.sql"),
        "0002",
    )
    .await?;

    Ok(())
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        run_migrations(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Currency catalog
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CurrencyRepository for PostgresRepo {
    async fn list_currencies(&self) -> Result<Vec<Currency>, RepoError> {
        let rows: Vec<DbCurrency> = sqlx::query_as(
            r#"SELECT id, code, name, base, created_at FROM currencies ORDER BY created_at, code"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbCurrency::into_domain).collect()
    }

    async fn find_currency(&self, code: &CurrencyCode) -> Result<Option<Currency>, RepoError> {
        let row: Option<DbCurrency> = sqlx::query_as(
            r#"SELECT id, code, name, base, created_at FROM currencies WHERE code = $1"#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbCurrency::into_domain).transpose()
    }

    async fn currency_exists(&self, code: &CurrencyCode) -> Result<bool, RepoError> {
        let exists: (bool,) =
            sqlx::query_as(r#"SELECT EXISTS(SELECT 1 FROM currencies WHERE code = $1)"#)
                .bind(code.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(exists.0)
    }

    async fn insert_currency(&self, currency: Currency) -> Result<Currency, RepoError> {
        sqlx::query(
            r#"INSERT INTO currencies (id, code, name, base, created_at) VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(currency.id.into_uuid())
        .bind(currency.code.as_str())
        .bind(&currency.name)
        .bind(currency.base.as_str())
        .bind(currency.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &currency.code))?;

        Ok(currency)
    }

    async fn update_currency(&self, currency: Currency) -> Result<Currency, RepoError> {
        let result = sqlx::query(r#"UPDATE currencies SET name = $1, base = $2 WHERE code = $3"#)
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
impl RateStore for PostgresRepo {
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
            r#"INSERT INTO exchange_rates (id, currency_code, rate, base, snapshot_at) VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(rate.id.into_uuid())
        .bind(rate.currency_code.as_str())
        .bind(rate.rate)
        .bind(rate.base.as_str())
        .bind(rate.timestamp)
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
               WHERE currency_code = $1
               ORDER BY snapshot_at DESC
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
               WHERE currency_code = $1 AND snapshot_at BETWEEN $2 AND $3
               ORDER BY snapshot_at DESC"#,
        )
        .bind(code.as_str())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbExchangeRate::into_domain).collect()
    }
}
