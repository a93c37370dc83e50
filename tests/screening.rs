use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use moneypress::config::Config;
use moneypress::models::profile::CompanyProfile;
use moneypress::services::screening_service::{ScreeningService, Stage};
use moneypress::sources::LocalDataSource;
use moneypress::store::DataStore;
use moneypress::{
    DateRange, EarningsCalendar, EarningsEvent, MarketDataSource, MoneyPressError,
    OptionableSymbols, PriceHistory, PricePoint, Result,
};

struct FakeSource {
    calendar: EarningsCalendar,
    optionable: OptionableSymbols,
    histories: HashMap<String, Vec<f64>>,
    profile_fetches: AtomicUsize,
}

fn history(symbol: &str, closes: &[f64]) -> PriceHistory {
    let start = NaiveDate::from_ymd_opt(2021, 4, 1).unwrap();
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: start + Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            adj_close: close,
            volume: 500_000,
        })
        .collect();
    PriceHistory::new(symbol, points)
}

#[async_trait]
impl MarketDataSource for FakeSource {
    fn source_name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_price_history(&self, symbol: &str) -> Result<PriceHistory> {
        self.histories
            .get(symbol)
            .map(|closes| history(symbol, closes))
            .ok_or_else(|| MoneyPressError::SourceUnavailable(format!("no page for {}", symbol)))
    }

    async fn fetch_earnings_calendar(&self, range: &DateRange) -> Result<EarningsCalendar> {
        let mut calendar = self.calendar.clone();
        calendar.retain(|e| range.contains(e.earnings_date));
        Ok(calendar)
    }

    async fn fetch_optionable_symbols(&self) -> Result<OptionableSymbols> {
        Ok(self.optionable.clone())
    }

    async fn fetch_company_profile(&self, symbol: &str) -> Result<CompanyProfile> {
        self.profile_fetches.fetch_add(1, Ordering::SeqCst);
        if symbol == "GONE" {
            return Err(MoneyPressError::SourceUnavailable(format!("no profile for {}", symbol)));
        }
        Ok(CompanyProfile::new(symbol, "Company").with_detail("Sector", "Technology"))
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 6, 9).unwrap()
}

fn fake_source() -> FakeSource {
    let day = |d: u32| NaiveDate::from_ymd_opt(2021, 6, d).unwrap();
    let calendar: EarningsCalendar = vec![
        EarningsEvent::new("AAPL", day(7), Some(1.40), Some(0.99), Some(41.41)),
        EarningsEvent::new("SHORT", day(3), Some(0.80), Some(0.70), Some(14.0)),
        EarningsEvent::new("GONE", day(2), Some(0.50), Some(0.40), Some(25.0)),
        EarningsEvent::new("LOSS", day(4), Some(0.02), Some(0.05), Some(-60.0)),
        EarningsEvent::new("GME", day(8), Some(-0.45), Some(-0.85), Some(47.06)),
    ]
    .into_iter()
    .collect();
    let optionable: OptionableSymbols = [
        ("AAPL", "APPLE INC"),
        ("SHORT", "SHORT HISTORY CORP"),
        ("GONE", "NO PAGE CORP"),
        ("LOSS", "LOSS MAKING CORP"),
    ]
    .into_iter()
    .collect();

    let rising: Vec<f64> = (0..30).map(|v| 120.0 + v as f64).collect();
    let mut histories = HashMap::new();
    histories.insert("AAPL".to_string(), rising);
    histories.insert("SHORT".to_string(), vec![10.0; 8]);

    FakeSource { calendar, optionable, histories, profile_fetches: AtomicUsize::new(0) }
}

#[tokio::test]
async fn full_screen_skips_failing_symbols() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new().with_data_dir(dir.path().to_str().unwrap());
    let service = ScreeningService::new(config, Arc::new(fake_source()));

    let report = service.run(today()).await.unwrap();

    // GME 没有周期权，LOSS 为负惊喜
    assert_eq!(report.earnings_events, 5);
    assert_eq!(report.optionable_symbols, 4);
    assert_eq!(report.pruned, 1);
    assert_eq!(
        report.candidates.symbols(),
        vec!["AAPL".to_string(), "GONE".to_string(), "SHORT".to_string()]
    );
    assert_eq!(report.analyzed(), 1);
    assert_eq!(report.candidates.get("AAPL").unwrap().price_history_score, Some(1.0));

    assert_eq!(report.profiles, 2);
    let mut stages: Vec<(&str, Stage)> = report
        .failures
        .iter()
        .map(|f| (f.symbol.as_str(), f.stage))
        .collect();
    stages.sort_by_key(|(symbol, _)| *symbol);
    assert_eq!(
        stages,
        vec![
            ("GONE", Stage::CompanyProfile),
            ("GONE", Stage::FetchPriceHistory),
            ("SHORT", Stage::Analysis),
        ]
    );

    let store = service.store();
    assert!(store.price_history_path("AAPL").exists());
    assert!(store.profile_path("AAPL").exists());
    assert!(!store.profile_path("GONE").exists());
    assert!(!store.price_history_path("SHORT").exists());

    let suggestions = store.load_suggestions().unwrap();
    assert_eq!(suggestions, report.candidates);

    let calendar = store.load_earnings_calendar().unwrap();
    let aapl = calendar.get("AAPL").unwrap();
    assert_eq!(aapl.days_since_earnings, 2);
    assert_eq!(aapl.earnings_score, 100.0);
}

#[tokio::test]
async fn analysis_round_trips_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new().with_data_dir(dir.path().to_str().unwrap());
    let service = ScreeningService::new(config, Arc::new(fake_source()));

    let analysis = service.analyze_symbol("AAPL").await.unwrap();
    let document = service.store().load_price_history("AAPL").unwrap();

    assert_eq!(document.analysis, analysis);
    assert_eq!(document.data.sma_data.len(), 30 - 20 + 1);
    assert_eq!(
        document.analysis.price_history_score.to_bits(),
        analysis.price_history_score.to_bits()
    );
}

#[tokio::test]
async fn debug_mode_limits_analyzed_symbols() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new()
        .with_data_dir(dir.path().to_str().unwrap())
        .with_debug_mode(true)
        .with_debug_symbol_limit(1);
    let service = ScreeningService::new(config, Arc::new(fake_source()));

    let report = service.run(today()).await.unwrap();

    assert_eq!(report.analyzed() + report.failures.len(), 1);
}

#[tokio::test]
async fn saved_profiles_refresh_after_a_week() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataStore::new(dir.path());
    let source = Arc::new(fake_source());
    let service = ScreeningService::new(
        Config::new().with_data_dir(dir.path().to_str().unwrap()),
        source.clone(),
    );
    let now = today().and_hms_opt(0, 0, 0).unwrap();

    let mut fresh = CompanyProfile::new("AAPL", "Company").with_detail("Sector", "Cached");
    fresh.stamp(now - Duration::days(6));
    store.save_company_profile(&fresh).unwrap();
    let profile = service.refresh_company_profile("AAPL", now).await.unwrap();
    assert_eq!(profile.detail("Sector"), Some("Cached"));
    assert_eq!(source.profile_fetches.load(Ordering::SeqCst), 0);

    let mut stale = fresh.clone();
    stale.stamp(now - Duration::days(7));
    store.save_company_profile(&stale).unwrap();
    let profile = service.refresh_company_profile("AAPL", now).await.unwrap();
    assert_eq!(profile.detail("Sector"), Some("Technology"));
    assert_eq!(profile.last_updated, Some(now));
    assert_eq!(source.profile_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(store.load_company_profile("AAPL").unwrap(), profile);
}

#[tokio::test]
async fn screening_keeps_saved_events_outside_the_window() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("earnings_calendar.json"),
        r#"{"JUNE": {"Company": "June Corp", "EPS Estimate": 0.5, "Reported EPS": 0.6,
                     "Surprise(%)": 20.0, "Earnings Date": "2021-06-01"},
            "MAY": {"Company": "May Corp", "EPS Estimate": 0.5, "Reported EPS": 0.6,
                    "Surprise(%)": 20.0, "Earnings Date": "2021-05-01"}}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("options.json"),
        r#"{"JUNE": {"company name": "JUNE CORP"}, "MAY": {"company name": "MAY CORP"}}"#,
    )
    .unwrap();

    let config = Config::new().with_data_dir(dir.path().to_str().unwrap());
    let source = Arc::new(LocalDataSource::new(DataStore::new(dir.path())));
    let service = ScreeningService::new(config, source);

    let june = service.screen_candidates(today()).await.unwrap();
    assert_eq!(june.candidates.symbols(), vec!["JUNE".to_string()]);

    let may = service
        .screen_candidates(NaiveDate::from_ymd_opt(2021, 5, 10).unwrap())
        .await
        .unwrap();
    assert_eq!(may.candidates.symbols(), vec!["MAY".to_string()]);

    let saved = service.store().load_earnings_calendar().unwrap();
    assert_eq!(saved.symbols(), vec!["JUNE".to_string(), "MAY".to_string()]);
    assert_eq!(saved.get("MAY").unwrap().days_since_earnings, 9);
}
