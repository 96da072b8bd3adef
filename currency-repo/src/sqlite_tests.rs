//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use currency_types::{
        Currency, CurrencyCode, CurrencyRepository, ExchangeRate, RateStore, RepoError,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn currency(c: &str, name: &str) -> Currency {
        Currency::new(code(c), name.to_string(), CurrencyCode::usd()).unwrap()
    }

    fn rate(c: &str, value: Decimal, ts: NaiveDateTime) -> ExchangeRate {
        ExchangeRate::new(code(c), value, CurrencyCode::usd(), ts)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Currency catalog
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_insert_and_find_currency() {
        let repo = setup_repo().await;

        let created = repo.insert_currency(currency("EUR", "Euro")).await.unwrap();
        let fetched = repo.find_currency(&code("EUR")).await.unwrap().unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.name, "Euro");
        assert_eq!(fetched.base, CurrencyCode::usd());
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_find_currency_not_found() {
        let repo = setup_repo().await;

        let result = repo.find_currency(&code("XYZ")).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_currency_exists() {
        let repo = setup_repo().await;
        repo.insert_currency(currency("GBP", "British Pound"))
            .await
            .unwrap();

        assert!(repo.currency_exists(&code("GBP")).await.unwrap());
        assert!(!repo.currency_exists(&code("JPY")).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_duplicate_code_conflicts() {
        let repo = setup_repo().await;
        repo.insert_currency(currency("EUR", "Euro")).await.unwrap();

        let result = repo.insert_currency(currency("EUR", "Euro again")).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_list_currencies_in_insertion_order() {
        let repo = setup_repo().await;
        for (c, name) in [("USD", "US Dollar"), ("EUR", "Euro"), ("JPY", "Japanese Yen")] {
            repo.insert_currency(currency(c, name)).await.unwrap();
        }

        let codes: Vec<String> = repo
            .list_currencies()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.code.to_string())
            .collect();

        assert_eq!(codes, vec!["USD", "EUR", "JPY"]);
    }

    #[tokio::test]
    async fn test_update_currency() {
        let repo = setup_repo().await;
        let mut jpy = repo
            .insert_currency(currency("JPY", "Yen"))
            .await
            .unwrap();

        jpy.rename("Japanese Yen".to_string(), code("EUR")).unwrap();
        repo.update_currency(jpy).await.unwrap();

        let fetched = repo.find_currency(&code("JPY")).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Japanese Yen");
        assert_eq!(fetched.base, code("EUR"));
    }

    #[tokio::test]
    async fn test_update_missing_currency() {
        let repo = setup_repo().await;

        let result = repo.update_currency(currency("CHF", "Swiss Franc")).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rate store
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_append_and_find_all() {
        let repo = setup_repo().await;
        repo.append_rate(rate("EUR", dec!(0.85), at(1, 10)))
            .await
            .unwrap();
        repo.append_rate(rate("EUR", dec!(0.86), at(1, 11)))
            .await
            .unwrap();
        repo.append_rate(rate("JPY", dec!(110.15), at(1, 10)))
            .await
            .unwrap();

        let all = repo.find_all_rates().await.unwrap();

        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_rate_round_trips_precisely() {
        let repo = setup_repo().await;
        let stored = repo
            .append_rate(rate("BTC", dec!(0.000023), at(1, 10)))
            .await
            .unwrap();

        let latest = repo.find_latest_rate(&code("BTC")).await.unwrap().unwrap();

        assert_eq!(latest, stored);
    }

    #[tokio::test]
    async fn test_sub_microsecond_timestamp_round_trips() {
        let repo = setup_repo().await;
        let ts = NaiveDate::from_ymd_opt(2024, 1, 3)
            .unwrap()
            .and_hms_nano_opt(12, 0, 0, 123_456_789)
            .unwrap();
        let stored = repo
            .append_rate(rate("EUR", dec!(0.85), ts))
            .await
            .unwrap();

        let latest = repo.find_latest_rate(&code("EUR")).await.unwrap().unwrap();

        assert_eq!(latest, stored);
    }

    #[tokio::test]
    async fn test_latest_is_max_timestamp_not_last_insert() {
        let repo = setup_repo().await;
        repo.append_rate(rate("EUR", dec!(0.90), at(2, 12)))
            .await
            .unwrap();
        // Older snapshot written later
        repo.append_rate(rate("EUR", dec!(0.80), at(1, 8)))
            .await
            .unwrap();

        let latest = repo.find_latest_rate(&code("EUR")).await.unwrap().unwrap();

        assert_eq!(latest.rate, dec!(0.90));
        assert_eq!(latest.timestamp, at(2, 12));
    }

    #[tokio::test]
    async fn test_latest_rate_absent() {
        let repo = setup_repo().await;

        let latest = repo.find_latest_rate(&code("GBP")).await.unwrap();

        assert!(latest.is_none());
    }

    #[tokio::test]
    async fn test_rates_between_is_inclusive_and_newest_first() {
        let repo = setup_repo().await;
        for (day, value) in [(1, dec!(0.81)), (2, dec!(0.82)), (3, dec!(0.83)), (4, dec!(0.84))] {
            repo.append_rate(rate("EUR", value, at(day, 0)))
                .await
                .unwrap();
        }
        repo.append_rate(rate("JPY", dec!(110), at(2, 0)))
            .await
            .unwrap();

        let rates = repo
            .find_rates_between(&code("EUR"), at(2, 0), at(3, 0))
            .await
            .unwrap();

        let values: Vec<Decimal> = rates.iter().map(|r| r.rate).collect();
        assert_eq!(values, vec![dec!(0.83), dec!(0.82)]);
    }

    #[tokio::test]
    async fn test_rates_between_empty_window() {
        let repo = setup_repo().await;
        repo.append_rate(rate("EUR", dec!(0.85), at(10, 0)))
            .await
            .unwrap();

        let rates = repo
            .find_rates_between(&code("EUR"), at(1, 0), at(2, 0))
            .await
            .unwrap();

        assert!(rates.is_empty());
    }
}
