use crate::models::earnings::{DateRange, EarningsCalendar};
use crate::models::options::OptionableSymbols;
use crate::models::price::PriceHistory;
use crate::models::profile::CompanyProfile;
use crate::errors::Result;
use async_trait::async_trait;

/// 行情数据来源。抓取层在此接口之外，分析代码只依赖注入的实现。
#[async_trait]
pub trait MarketDataSource {
    /// Name used in log messages
    fn source_name(&self) -> &'static str;

    /// Fetch the daily price history for one symbol
    async fn fetch_price_history(&self, symbol: &str) -> Result<PriceHistory>;

    /// Fetch earnings events reported within the date range, keyed by symbol
    async fn fetch_earnings_calendar(&self, range: &DateRange) -> Result<EarningsCalendar>;

    /// Fetch the symbols that list weekly options
    async fn fetch_optionable_symbols(&self) -> Result<OptionableSymbols>;

    /// Fetch the company (or ETF) profile and quote summary
    async fn fetch_company_profile(&self, symbol: &str) -> Result<CompanyProfile>;
}
