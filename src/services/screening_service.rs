use crate::analysis::{candidates, composite};
use crate::config::Config;
use crate::errors::{Result, MoneyPressError};
use crate::models::analysis::{AnalysisResult, PriceHistoryDocument};
use crate::models::earnings::{DateRange, EarningsCalendar};
use crate::models::options::OptionableSymbols;
use crate::models::profile::CompanyProfile;
use crate::sources::base::MarketDataSource;
use crate::sources::mapping;
use crate::store::DataStore;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, error, info, warn};
use std::fmt;
use std::sync::Arc;

/// 单个股票处理失败的环节
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CompanyProfile,
    FetchPriceHistory,
    Analysis,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CompanyProfile => "company profile",
            Stage::FetchPriceHistory => "fetch price history",
            Stage::Analysis => "analysis",
            Stage::Persist => "persist",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct SymbolFailure {
    pub symbol: String,
    pub stage: Stage,
    pub error: MoneyPressError,
}

fn fail(symbol: &str, stage: Stage) -> impl FnOnce(MoneyPressError) -> SymbolFailure + '_ {
    move |error: MoneyPressError| SymbolFailure { symbol: symbol.to_string(), stage, error }
}

/// 一次筛选运行的结果
#[derive(Debug, Default)]
pub struct ScreeningReport {
    pub earnings_events: usize,
    pub optionable_symbols: usize,
    pub pruned: usize,
    pub profiles: usize,
    pub candidates: EarningsCalendar,
    pub failures: Vec<SymbolFailure>,
}

impl ScreeningReport {
    pub fn analyzed(&self) -> usize {
        self.candidates.iter().filter(|e| e.price_history_score.is_some()).count()
    }
}

/// 筛选服务：财报日历 → 周期权列表 → 候选过滤 → 逐个股票的价格分析
pub struct ScreeningService {
    config: Config,
    source: Arc<dyn MarketDataSource + Send + Sync>,
    store: DataStore,
}

impl ScreeningService {
    pub fn new(config: Config, source: Arc<dyn MarketDataSource + Send + Sync>) -> Self {
        let store = DataStore::new(&config.data_dir);
        Self { config, source, store }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// 获取最近若干天的财报日历并计算财报得分。结果并入已保存的日历，
    /// 范围外的事件保持不变。
    pub async fn build_earnings_calendar(&self, today: NaiveDate) -> Result<EarningsCalendar> {
        let range = DateRange::days_in_past(today, self.config.earnings_days_in_past);
        info!("Fetching earnings calendar from {} ({} to {})",
              self.source.source_name(), range.start, range.end);

        let mut calendar = self.source.fetch_earnings_calendar(&range).await?;
        calendar.refresh_scores(today);
        self.merge_saved_calendar(&calendar)?;
        Ok(calendar)
    }

    fn merge_saved_calendar(&self, calendar: &EarningsCalendar) -> Result<()> {
        let mut saved = match self.store.load_value(&self.store.earnings_calendar_path()) {
            Ok(value) => mapping::earnings_events_from_value(&value)?,
            Err(MoneyPressError::SourceUnavailable(_)) => EarningsCalendar::new(),
            Err(e) => return Err(e),
        };
        debug!("Merging {} events into {} saved events", calendar.len(), saved.len());
        saved.merge(calendar.clone());
        self.store.save_earnings_calendar(&saved)
    }

    pub async fn load_optionable_symbols(&self) -> Result<OptionableSymbols> {
        info!("Fetching weekly option symbols from {}", self.source.source_name());
        let symbols = self.source.fetch_optionable_symbols().await?;
        self.store.save_optionable_symbols(&symbols)?;
        Ok(symbols)
    }

    /// 财报日历与周期权列表取交集，再剔除负惊喜
    pub fn select_candidates(
        &self,
        calendar: &EarningsCalendar,
        optionable: &OptionableSymbols,
    ) -> (EarningsCalendar, usize) {
        let mut selected = candidates::filter_candidates(calendar, optionable);
        info!("Current record count: {}", selected.len());
        let pruned = candidates::prune_negative_surprises(&mut selected);
        (selected, pruned)
    }

    /// 获取公司资料。本地保存的资料未过期时直接使用，否则从数据来源重新获取并保存。
    pub async fn refresh_company_profile(
        &self,
        symbol: &str,
        now: NaiveDateTime,
    ) -> std::result::Result<CompanyProfile, SymbolFailure> {
        match self.store.load_company_profile(symbol) {
            Ok(profile) if !profile.is_stale(now, self.config.profile_refresh_days) => {
                debug!("{} profile is up to date", symbol);
                return Ok(profile);
            }
            Ok(_) => info!("{} profile is older than {} days, refreshing",
                           symbol, self.config.profile_refresh_days),
            Err(MoneyPressError::SourceUnavailable(_)) => {}
            Err(e) => warn!("{} saved profile unreadable, refreshing: {}", symbol, e),
        }

        let mut profile = self.source
            .fetch_company_profile(symbol)
            .await
            .map_err(fail(symbol, Stage::CompanyProfile))?;
        if profile.last_updated.is_none() {
            profile.stamp(now);
        }

        self.store
            .save_company_profile(&profile)
            .map_err(fail(symbol, Stage::Persist))?;
        Ok(profile)
    }

    /// 分析单个股票并保存其价格历史文档
    pub async fn analyze_symbol(&self, symbol: &str) -> std::result::Result<AnalysisResult, SymbolFailure> {
        let mut history = self.source
            .fetch_price_history(symbol)
            .await
            .map_err(fail(symbol, Stage::FetchPriceHistory))?;

        let analysis = composite::compute_analysis(
            &mut history,
            self.config.window_size,
            &self.config.close_trend_days,
        )
        .map_err(fail(symbol, Stage::Analysis))?;

        let document = PriceHistoryDocument::new(&history, analysis.clone());
        self.store
            .save_price_history(symbol, &document)
            .map_err(fail(symbol, Stage::Persist))?;

        Ok(analysis)
    }

    /// 候选筛选（不做价格分析），保存建议列表
    pub async fn screen_candidates(&self, today: NaiveDate) -> Result<ScreeningReport> {
        let calendar = self.build_earnings_calendar(today).await?;
        let optionable = self.load_optionable_symbols().await?;
        let (candidates, pruned) = self.select_candidates(&calendar, &optionable);

        self.store.save_suggestions(&candidates)?;

        Ok(ScreeningReport {
            earnings_events: calendar.len(),
            optionable_symbols: optionable.len(),
            pruned,
            profiles: 0,
            candidates,
            failures: Vec::new(),
        })
    }

    /// 完整流程。单个股票的失败只记录，不影响其余股票。
    /// 公司资料的过期判断以筛选日零点为准。
    pub async fn run(&self, today: NaiveDate) -> Result<ScreeningReport> {
        let mut report = self.screen_candidates(today).await?;
        let now = today.and_time(NaiveTime::MIN);

        let mut symbols = report.candidates.symbols();
        if self.config.debug_mode {
            let original_count = symbols.len();
            symbols.truncate(self.config.debug_symbol_limit);
            info!("DEBUG MODE: Processing only {} out of {} candidates",
                  symbols.len(), original_count);
        }

        for symbol in symbols {
            match self.refresh_company_profile(&symbol, now).await {
                Ok(_) => report.profiles += 1,
                Err(failure) => {
                    error!("{}: {} failed: {}", failure.symbol, failure.stage, failure.error);
                    report.failures.push(failure);
                }
            }

            match self.analyze_symbol(&symbol).await {
                Ok(analysis) => {
                    if let Some(event) = report.candidates.get_mut(&symbol) {
                        event.price_history_score = Some(analysis.price_history_score);
                    }
                }
                Err(failure) => {
                    error!("{}: {} failed: {}", failure.symbol, failure.stage, failure.error);
                    report.failures.push(failure);
                }
            }
        }

        if !report.failures.is_empty() {
            warn!("{} failures while processing {} candidates",
                  report.failures.len(), report.candidates.len());
        }

        self.store.save_suggestions(&report.candidates)?;
        info!("Successfully screened {} candidates for {}", report.candidates.len(), today);
        Ok(report)
    }
}
