//! CurrencyService, RateRefresher and CatalogSync unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime, Timelike};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use currency_types::{
        AppError, ConversionQuery, CreateCurrencyRequest, Currency, CurrencyCode, CurrencyList,
        CurrencyRepository, ExchangeRate, ProviderError, RateCache, RateHistoryQuery,
        RateProviderClient, RateStore, RatesQuery, RatesResponse, RecordRateRequest, RepoError,
        UpdateCurrencyRequest,
    };
    use exchange_rates::InMemoryRateCache;

    use crate::CurrencyService;
    use crate::jobs::{RefreshConfig, RefreshMode};

    // ─────────────────────────────────────────────────────────────────────────
    // Mock repository
    // ─────────────────────────────────────────────────────────────────────────

    /// In-memory catalog and rate store that counts store reads.
    #[derive(Default)]
    pub struct MockRepo {
        currencies: Mutex<Vec<Currency>>,
        rates: Mutex<Vec<ExchangeRate>>,
        latest_lookups: AtomicUsize,
        fail_list: AtomicBool,
        fail_append: AtomicBool,
    }

    impl MockRepo {
        pub fn with_catalog(entries: &[(&str, &str)]) -> Self {
            let repo = Self::default();
            {
                let mut currencies = repo.currencies.lock().unwrap();
                for (c, base) in entries {
                    currencies.push(
                        Currency::new(code(c), format!("{c} currency"), code(base)).unwrap(),
                    );
                }
            }
            repo
        }

        pub fn seed_rate(&self, c: &str, rate: Decimal, ts: NaiveDateTime) {
            self.rates
                .lock()
                .unwrap()
                .push(ExchangeRate::new(code(c), rate, CurrencyCode::usd(), ts));
        }

        pub fn stored_rates(&self) -> Vec<ExchangeRate> {
            self.rates.lock().unwrap().clone()
        }

        pub fn latest_lookups(&self) -> usize {
            self.latest_lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CurrencyRepository for MockRepo {
        async fn list_currencies(&self) -> Result<Vec<Currency>, RepoError> {
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(RepoError::Database("catalog unavailable".into()));
            }
            Ok(self.currencies.lock().unwrap().clone())
        }

        async fn find_currency(&self, c: &CurrencyCode) -> Result<Option<Currency>, RepoError> {
            Ok(self
                .currencies
                .lock()
                .unwrap()
                .iter()
                .find(|x| &x.code == c)
                .cloned())
        }

        async fn currency_exists(&self, c: &CurrencyCode) -> Result<bool, RepoError> {
            Ok(self.currencies.lock().unwrap().iter().any(|x| &x.code == c))
        }

        async fn insert_currency(&self, currency: Currency) -> Result<Currency, RepoError> {
            let mut currencies = self.currencies.lock().unwrap();
            if currencies.iter().any(|x| x.code == currency.code) {
                return Err(RepoError::Conflict(currency.code.to_string()));
            }
            currencies.push(currency.clone());
            Ok(currency)
        }

        async fn update_currency(&self, currency: Currency) -> Result<Currency, RepoError> {
            let mut currencies = self.currencies.lock().unwrap();
            let existing = currencies
                .iter_mut()
                .find(|x| x.code == currency.code)
                .ok_or(RepoError::NotFound)?;
            *existing = currency.clone();
            Ok(currency)
        }
    }

    #[async_trait]
    impl RateStore for MockRepo {
        async fn find_all_rates(&self) -> Result<Vec<ExchangeRate>, RepoError> {
            Ok(self.rates.lock().unwrap().clone())
        }

        async fn append_rate(&self, rate: ExchangeRate) -> Result<ExchangeRate, RepoError> {
            if self.fail_append.load(Ordering::SeqCst) {
                return Err(RepoError::Database("disk full".into()));
            }
            self.rates.lock().unwrap().push(rate.clone());
            Ok(rate)
        }

        async fn find_latest_rate(
            &self,
            c: &CurrencyCode,
        ) -> Result<Option<ExchangeRate>, RepoError> {
            self.latest_lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rates
                .lock()
                .unwrap()
                .iter()
                .filter(|r| &r.currency_code == c)
                .max_by_key(|r| r.timestamp)
                .cloned())
        }

        async fn find_rates_between(
            &self,
            c: &CurrencyCode,
            start: NaiveDateTime,
            end: NaiveDateTime,
        ) -> Result<Vec<ExchangeRate>, RepoError> {
            let mut rates: Vec<ExchangeRate> = self
                .rates
                .lock()
                .unwrap()
                .iter()
                .filter(|r| &r.currency_code == c && r.timestamp >= start && r.timestamp <= end)
                .cloned()
                .collect();
            rates.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            Ok(rates)
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mock provider
    // ─────────────────────────────────────────────────────────────────────────

    #[derive(Clone)]
    pub enum Reply {
        Rates(Vec<(&'static str, f64)>),
        /// Rates quoted against a base other than the one requested.
        RatesFrom(&'static str, Vec<(&'static str, f64)>),
        Empty,
        Fail,
        Hang,
    }

    /// Scripted provider keyed by requested base ("" for provider default).
    #[derive(Default)]
    pub struct MockProvider {
        replies: Mutex<HashMap<String, Reply>>,
        currencies: Mutex<Option<CurrencyList>>,
        calls: Mutex<Vec<RatesQuery>>,
        credentials: Mutex<Vec<String>>,
    }

    impl MockProvider {
        pub fn reply(self, base: &str, reply: Reply) -> Self {
            self.replies.lock().unwrap().insert(base.to_string(), reply);
            self
        }

        pub fn currencies(self, list: &[(&str, &str)]) -> Self {
            *self.currencies.lock().unwrap() = Some(
                list.iter()
                    .map(|(c, n)| (c.to_string(), n.to_string()))
                    .collect(),
            );
            self
        }

        pub fn calls(&self) -> Vec<RatesQuery> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RateProviderClient for MockProvider {
        async fn fetch_currencies(&self) -> Result<CurrencyList, ProviderError> {
            self.currencies
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ProviderError::Http("connection refused".into()))
        }

        async fn fetch_rates(
            &self,
            credential: &str,
            query: &RatesQuery,
        ) -> Result<RatesResponse, ProviderError> {
            self.calls.lock().unwrap().push(query.clone());
            self.credentials.lock().unwrap().push(credential.to_string());

            let base = query.base.as_ref().map(|b| b.to_string()).unwrap_or_default();
            let reply = self.replies.lock().unwrap().get(&base).cloned();
            let mut base = if base.is_empty() { "USD".into() } else { base };
            let rates = match reply {
                Some(Reply::Rates(rates)) => Some(collect_rates(rates)),
                Some(Reply::RatesFrom(quoted, rates)) => {
                    base = quoted.to_string();
                    Some(collect_rates(rates))
                }
                Some(Reply::Empty) => None,
                Some(Reply::Fail) | None => {
                    return Err(ProviderError::Status {
                        status: 500,
                        message: "upstream error".into(),
                    });
                }
                Some(Reply::Hang) => return std::future::pending().await,
            };

            Ok(RatesResponse {
                disclaimer: None,
                license: None,
                timestamp: 1_700_000_000,
                base,
                rates,
            })
        }
    }

    fn collect_rates(rates: Vec<(&'static str, f64)>) -> BTreeMap<String, f64> {
        rates
            .into_iter()
            .map(|(c, v)| (c.to_string(), v))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn build(
        repo: MockRepo,
        provider: MockProvider,
        config: RefreshConfig,
    ) -> (
        CurrencyService<MockRepo, MockProvider>,
        Arc<MockRepo>,
        Arc<MockProvider>,
    ) {
        let repo = Arc::new(repo);
        let provider = Arc::new(provider);
        let cache: Arc<dyn RateCache> = Arc::new(InMemoryRateCache::new());
        let service = CurrencyService::new(repo.clone(), provider.clone(), cache, config);
        (service, repo, provider)
    }

    fn setup(
        repo: MockRepo,
        provider: MockProvider,
    ) -> (
        CurrencyService<MockRepo, MockProvider>,
        Arc<MockRepo>,
        Arc<MockProvider>,
    ) {
        build(repo, provider, RefreshConfig::new("test-app-id"))
    }

    fn conversion(from: &str, to: &str, amount: Decimal) -> ConversionQuery {
        ConversionQuery {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_convert_same_currency_skips_lookup() {
        let (service, repo, _) = setup(MockRepo::default(), MockProvider::default());

        let result = service
            .convert(conversion("XAU", "XAU", dec!(12.3456)))
            .await
            .unwrap();

        assert_eq!(result.converted, dec!(12.3456));
        assert_eq!(repo.latest_lookups(), 0);
    }

    #[tokio::test]
    async fn test_convert_usd_to_eur() {
        let repo = MockRepo::default();
        repo.seed_rate("USD", dec!(1), at(1, 0));
        repo.seed_rate("EUR", dec!(0.85), at(1, 0));
        let (service, _, _) = setup(repo, MockProvider::default());

        let result = service
            .convert(conversion("USD", "EUR", dec!(100)))
            .await
            .unwrap();

        assert_eq!(result.converted, dec!(85.00));
        assert_eq!(result.converted.to_string(), "85.00");
        assert_eq!(result.amount, dec!(100));
    }

    #[tokio::test]
    async fn test_convert_missing_rate() {
        let repo = MockRepo::default();
        repo.seed_rate("USD", dec!(1), at(1, 0));
        let (service, _, _) = setup(repo, MockProvider::default());

        let result = service.convert(conversion("USD", "GBP", dec!(10))).await;

        assert!(matches!(result, Err(AppError::RateUnavailable(_))));
    }

    #[tokio::test]
    async fn test_convert_missing_source_rate() {
        let repo = MockRepo::default();
        repo.seed_rate("EUR", dec!(0.85), at(1, 0));
        let (service, repo, _) = setup(repo, MockProvider::default());

        let result = service.convert(conversion("GBP", "EUR", dec!(10))).await;

        assert!(matches!(result, Err(AppError::RateUnavailable(_))));
        // Target is never looked up once the source is missing
        assert_eq!(repo.latest_lookups(), 1);
    }

    #[tokio::test]
    async fn test_convert_zero_source_rate() {
        let repo = MockRepo::default();
        repo.seed_rate("XXX", dec!(0), at(1, 0));
        repo.seed_rate("EUR", dec!(0.85), at(1, 0));
        let (service, _, _) = setup(repo, MockProvider::default());

        let result = service.convert(conversion("XXX", "EUR", dec!(10))).await;

        assert!(matches!(result, Err(AppError::RateUnavailable(_))));
    }

    #[tokio::test]
    async fn test_convert_rejects_malformed_code() {
        let (service, _, _) = setup(MockRepo::default(), MockProvider::default());

        let result = service.convert(conversion("usd", "EUR", dec!(1))).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read-through lookup
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_cache_miss_falls_back_to_store_once() {
        let repo = MockRepo::default();
        repo.seed_rate("GBP", dec!(0.75), at(1, 0));
        let (service, repo, _) = setup(repo, MockProvider::default());

        let first = service.latest_rate("GBP").await.unwrap();
        assert_eq!(repo.latest_lookups(), 1);
        assert!(service.cache().get(&code("GBP")).is_some());

        let second = service.latest_rate("GBP").await.unwrap();
        assert_eq!(repo.latest_lookups(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_latest_rate_not_found() {
        let (service, repo, _) = setup(MockRepo::default(), MockProvider::default());

        let result = service.latest_rate("GBP").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(repo.latest_lookups(), 1);
        assert!(service.cache().get(&code("GBP")).is_none());
    }

    #[tokio::test]
    async fn test_warm_cache_loads_every_code() {
        let repo = MockRepo::default();
        repo.seed_rate("EUR", dec!(0.85), at(1, 0));
        repo.seed_rate("EUR", dec!(0.86), at(2, 0));
        repo.seed_rate("JPY", dec!(110), at(1, 0));
        let (service, repo, _) = setup(repo, MockProvider::default());

        let applied = service.warm_cache().await.unwrap();

        assert_eq!(applied, 3);
        assert_eq!(service.cache().get_all().len(), 2);
        service.latest_rate("JPY").await.unwrap();
        assert_eq!(repo.latest_lookups(), 0);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rate refresh
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_refresh_batches_by_base() {
        let repo = MockRepo::with_catalog(&[("USD", "USD"), ("EUR", "USD"), ("JPY", "EUR")]);
        let provider = MockProvider::default()
            .reply("USD", Reply::Rates(vec![("USD", 1.0), ("EUR", 0.85)]))
            .reply("EUR", Reply::Rates(vec![("JPY", 129.53)]));
        let (service, repo, provider) = setup(repo, provider);

        let report = service.refresh_rates().await;

        assert_eq!(report.currencies, 3);
        assert_eq!(report.groups, 2);
        assert_eq!(report.groups_skipped, 0);
        assert_eq!(report.rates_updated, 3);
        assert!(report.error.is_none());

        let mut calls: Vec<(String, String)> = provider
            .calls()
            .into_iter()
            .map(|q| {
                assert!(!q.pretty_print);
                assert!(!q.show_alternative);
                (q.base.unwrap().to_string(), q.symbols.unwrap())
            })
            .collect();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                ("EUR".to_string(), "JPY".to_string()),
                ("USD".to_string(), "USD,EUR".to_string()),
            ]
        );
        assert!(
            provider
                .credentials
                .lock()
                .unwrap()
                .iter()
                .all(|c| c == "test-app-id")
        );

        assert_eq!(repo.stored_rates().len(), 3);
        let jpy = service.cache().get(&code("JPY")).unwrap();
        assert_eq!(jpy.base, code("EUR"));
        assert_eq!(jpy.rate, dec!(129.53));
        assert_eq!(service.cache().get_all().len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_keys_rows_on_response_base() {
        let repo = MockRepo::with_catalog(&[("JPY", "EUR")]);
        let provider =
            MockProvider::default().reply("EUR", Reply::RatesFrom("USD", vec![("JPY", 110.15)]));
        let (service, repo, _) = setup(repo, provider);

        let report = service.refresh_rates().await;

        assert_eq!(report.rates_updated, 1);
        let stored = repo.stored_rates();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].base, code("USD"));
        let jpy = service.cache().get(&code("JPY")).unwrap();
        assert_eq!(jpy.base, code("USD"));
        assert_eq!(jpy, stored[0]);
    }

    #[tokio::test]
    async fn test_failed_group_does_not_block_others() {
        let repo = MockRepo::with_catalog(&[("USD", "USD"), ("EUR", "USD"), ("JPY", "EUR")]);
        let provider = MockProvider::default()
            .reply("USD", Reply::Fail)
            .reply("EUR", Reply::Rates(vec![("JPY", 129.53)]));
        let (service, repo, _) = setup(repo, provider);

        let report = service.refresh_rates().await;

        assert_eq!(report.groups, 2);
        assert_eq!(report.groups_skipped, 1);
        assert_eq!(report.rates_updated, 1);
        assert!(report.error.is_none());
        assert_eq!(repo.stored_rates().len(), 1);
        assert!(service.cache().get(&code("JPY")).is_some());
        assert!(service.cache().get(&code("EUR")).is_none());
    }

    #[tokio::test]
    async fn test_empty_group_response_is_skipped() {
        let repo = MockRepo::with_catalog(&[("USD", "USD"), ("JPY", "EUR")]);
        let provider = MockProvider::default()
            .reply("USD", Reply::Empty)
            .reply("EUR", Reply::Rates(vec![("JPY", 129.53)]));
        let (service, _, _) = setup(repo, provider);

        let report = service.refresh_rates().await;

        assert_eq!(report.groups_skipped, 1);
        assert_eq!(report.rates_updated, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_group_times_out() {
        let repo = MockRepo::with_catalog(&[("USD", "USD"), ("JPY", "EUR")]);
        let provider = MockProvider::default()
            .reply("USD", Reply::Hang)
            .reply("EUR", Reply::Rates(vec![("JPY", 129.53)]));
        let config =
            RefreshConfig::new("test-app-id").with_call_timeout(Some(Duration::from_secs(5)));
        let (service, _, _) = build(repo, provider, config);

        let report = service.refresh_rates().await;

        assert_eq!(report.groups_skipped, 1);
        assert_eq!(report.rates_updated, 1);
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn test_empty_catalog_makes_no_calls() {
        let (service, repo, provider) = setup(MockRepo::default(), MockProvider::default());

        let report = service.refresh_rates().await;

        assert_eq!(report.currencies, 0);
        assert_eq!(report.groups, 0);
        assert_eq!(report.rates_updated, 0);
        assert!(provider.calls().is_empty());
        assert!(repo.stored_rates().is_empty());
        assert!(service.cache().get_all().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_aborts_cycle() {
        let repo = MockRepo::with_catalog(&[("USD", "USD"), ("JPY", "EUR")]);
        repo.fail_append.store(true, Ordering::SeqCst);
        let provider = MockProvider::default()
            .reply("USD", Reply::Rates(vec![("USD", 1.0)]))
            .reply("EUR", Reply::Rates(vec![("JPY", 129.53)]));
        let (service, _, provider) = setup(repo, provider);

        let report = service.refresh_rates().await;

        assert!(report.error.is_some());
        assert_eq!(report.rates_updated, 0);
        // Groups run in base order, so only the EUR group was attempted
        assert_eq!(provider.calls().len(), 1);
        assert!(service.cache().get_all().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_failure_aborts_cycle() {
        let repo = MockRepo::with_catalog(&[("USD", "USD")]);
        repo.fail_list.store(true, Ordering::SeqCst);
        let (service, _, provider) = setup(repo, MockProvider::default());

        let report = service.refresh_rates().await;

        assert!(report.error.unwrap().contains("catalog unavailable"));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_skips_invalid_entries() {
        let repo = MockRepo::with_catalog(&[("USD", "USD"), ("EUR", "USD")]);
        let provider = MockProvider::default().reply(
            "USD",
            Reply::Rates(vec![("EUR", 0.85), ("eur", 0.9), ("XXX", f64::NAN)]),
        );
        let (service, repo, _) = setup(repo, provider);

        let report = service.refresh_rates().await;

        assert_eq!(report.rates_updated, 1);
        assert_eq!(report.groups_skipped, 0);
        assert_eq!(repo.stored_rates()[0].currency_code, code("EUR"));
    }

    #[tokio::test]
    async fn test_refresh_normalises_provider_floats() {
        let repo = MockRepo::with_catalog(&[("BTC", "USD")]);
        let provider =
            MockProvider::default().reply("USD", Reply::Rates(vec![("BTC", 0.0000234567891)]));
        let (service, repo, _) = setup(repo, provider);

        service.refresh_rates().await;

        assert_eq!(repo.stored_rates()[0].rate, dec!(0.000023));
    }

    #[tokio::test]
    async fn test_single_mode_keeps_catalog_codes_only() {
        let repo = MockRepo::with_catalog(&[("USD", "USD"), ("EUR", "USD"), ("JPY", "EUR")]);
        let provider = MockProvider::default().reply(
            "",
            Reply::Rates(vec![("USD", 1.0), ("EUR", 0.85), ("GBP", 0.75)]),
        );
        let config = RefreshConfig::new("test-app-id").with_mode(RefreshMode::Single);
        let (service, repo, provider) = build(repo, provider, config);

        let report = service.refresh_rates().await;

        assert_eq!(provider.calls(), vec![RatesQuery::default()]);
        assert_eq!(report.groups, 1);
        assert_eq!(report.rates_updated, 2);
        assert_eq!(repo.stored_rates().len(), 2);
        assert!(service.cache().get(&code("GBP")).is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_currency() {
        let (service, _, _) = setup(MockRepo::default(), MockProvider::default());

        let currency = service
            .create_currency(CreateCurrencyRequest {
                code: "EUR".into(),
                name: "Euro".into(),
                base: "USD".into(),
            })
            .await
            .unwrap();

        assert_eq!(currency.code, code("EUR"));
        assert_eq!(service.get_currency("EUR").await.unwrap().id, currency.id);
    }

    #[tokio::test]
    async fn test_create_currency_validation() {
        let (service, _, _) =
            setup(MockRepo::with_catalog(&[("EUR", "USD")]), MockProvider::default());

        for (c, name) in [("EUR", "Euro"), ("eu", "Euro"), ("GBP", "   ")] {
            let result = service
                .create_currency(CreateCurrencyRequest {
                    code: c.into(),
                    name: name.into(),
                    base: "USD".into(),
                })
                .await;
            assert!(
                matches!(result, Err(AppError::BadRequest(_))),
                "{c}/{name:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_update_currency() {
        let (service, _, _) =
            setup(MockRepo::with_catalog(&[("JPY", "USD")]), MockProvider::default());

        let updated = service
            .update_currency(
                "JPY",
                UpdateCurrencyRequest {
                    name: "Japanese Yen".into(),
                    base: "EUR".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Japanese Yen");
        assert_eq!(updated.base, code("EUR"));

        let missing = service
            .update_currency(
                "CHF",
                UpdateCurrencyRequest {
                    name: "Swiss Franc".into(),
                    base: "USD".into(),
                },
            )
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_catalog_sync_adds_missing_codes_only() {
        let repo = MockRepo::with_catalog(&[("USD", "USD")]);
        let provider = MockProvider::default().currencies(&[
            ("USD", "United States Dollar"),
            ("EUR", "Euro"),
            ("usd", "lowercase"),
            ("XAU", "  "),
        ]);
        let (service, repo, _) = setup(repo, provider);

        let report = service.sync_catalog().await;

        assert_eq!(report.fetched, 4);
        assert_eq!(report.added, 1);
        assert!(report.error.is_none());

        let catalog = repo.list_currencies().await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].name, "USD currency");
        let eur = service.get_currency("EUR").await.unwrap();
        assert_eq!(eur.name, "Euro");
        assert_eq!(eur.base, CurrencyCode::usd());
    }

    #[tokio::test]
    async fn test_catalog_sync_provider_failure_is_swallowed() {
        let (service, _, _) = setup(MockRepo::default(), MockProvider::default());

        let report = service.sync_catalog().await;

        assert_eq!(report.added, 0);
        assert!(report.error.is_some());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Manual rates and history
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_record_rate_writes_store_and_cache() {
        let (service, repo, _) = setup(MockRepo::default(), MockProvider::default());

        let stored = service
            .record_rate(RecordRateRequest {
                currency_code: "EUR".into(),
                rate: dec!(0.8512345678),
                base: "USD".into(),
                timestamp: Some(at(3, 12)),
            })
            .await
            .unwrap();

        assert_eq!(stored.rate, dec!(0.851235));
        assert_eq!(repo.stored_rates(), vec![stored.clone()]);
        assert_eq!(service.cache().get(&code("EUR")), Some(stored));
    }

    #[tokio::test]
    async fn test_record_rate_keeps_store_precision() {
        let (service, repo, _) = setup(MockRepo::default(), MockProvider::default());
        let day = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();

        let stored = service
            .record_rate(RecordRateRequest {
                currency_code: "EUR".into(),
                rate: dec!(0.85),
                base: "USD".into(),
                timestamp: Some(day.and_hms_nano_opt(12, 0, 0, 123_456_789).unwrap()),
            })
            .await
            .unwrap();

        assert_eq!(
            stored.timestamp,
            day.and_hms_micro_opt(12, 0, 0, 123_456).unwrap()
        );
        assert_eq!(repo.stored_rates(), vec![stored.clone()]);
        assert_eq!(service.cache().get(&code("EUR")), Some(stored.clone()));

        service.cache().clear();
        assert_eq!(service.latest_rate("EUR").await.unwrap(), stored);
    }

    #[tokio::test]
    async fn test_record_rate_defaults_timestamp_to_micros() {
        let (service, repo, _) = setup(MockRepo::default(), MockProvider::default());

        let stored = service
            .record_rate(RecordRateRequest {
                currency_code: "EUR".into(),
                rate: dec!(0.85),
                base: "USD".into(),
                timestamp: None,
            })
            .await
            .unwrap();

        assert_eq!(stored.timestamp.nanosecond() % 1_000, 0);
        assert_eq!(repo.stored_rates(), vec![stored.clone()]);
        assert_eq!(service.cache().get(&code("EUR")), Some(stored));
    }

    #[tokio::test]
    async fn test_record_rate_rejects_non_positive() {
        let (service, repo, _) = setup(MockRepo::default(), MockProvider::default());

        let result = service
            .record_rate(RecordRateRequest {
                currency_code: "EUR".into(),
                rate: dec!(0),
                base: "USD".into(),
                timestamp: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(repo.stored_rates().is_empty());
    }

    #[tokio::test]
    async fn test_rate_history() {
        let repo = MockRepo::default();
        repo.seed_rate("EUR", dec!(0.81), at(1, 0));
        repo.seed_rate("EUR", dec!(0.82), at(2, 0));
        repo.seed_rate("EUR", dec!(0.83), at(3, 0));
        let (service, _, _) = setup(repo, MockProvider::default());

        let rates = service
            .rate_history(
                "EUR",
                RateHistoryQuery {
                    start: at(2, 0),
                    end: at(3, 0),
                },
            )
            .await
            .unwrap();
        let values: Vec<Decimal> = rates.iter().map(|r| r.rate).collect();
        assert_eq!(values, vec![dec!(0.83), dec!(0.82)]);

        let inverted = service
            .rate_history(
                "EUR",
                RateHistoryQuery {
                    start: at(3, 0),
                    end: at(1, 0),
                },
            )
            .await;
        assert!(matches!(inverted, Err(AppError::BadRequest(_))));
    }
}
