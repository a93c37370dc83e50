use crate::errors::Result;
use crate::models::earnings::{DateRange, EarningsCalendar};
use crate::models::options::OptionableSymbols;
use crate::models::price::PriceHistory;
use crate::models::profile::CompanyProfile;
use crate::sources::base::MarketDataSource;
use crate::sources::mapping;
use crate::store::DataStore;
use async_trait::async_trait;
use log::{debug, info};

/// 从本地数据目录读取抓取程序导出（或之前保存）的 JSON 数据。
/// 与远程镜像一样按表头宽松解析，两种来源接受相同的文件格式。
pub struct LocalDataSource {
    store: DataStore,
}

impl LocalDataSource {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MarketDataSource for LocalDataSource {
    fn source_name(&self) -> &'static str {
        "local"
    }

    async fn fetch_price_history(&self, symbol: &str) -> Result<PriceHistory> {
        debug!("Loading price history for {} from {}", symbol, self.store.data_dir().display());
        let value = self.store.load_value(&self.store.price_history_path(symbol))?;
        mapping::price_history_from_value(symbol, &value)
    }

    async fn fetch_earnings_calendar(&self, range: &DateRange) -> Result<EarningsCalendar> {
        let value = self.store.load_value(&self.store.earnings_calendar_path())?;
        let calendar = mapping::earnings_calendar_from_value(&value, range)?;
        info!("Loaded {} earnings events between {} and {}", calendar.len(), range.start, range.end);
        Ok(calendar)
    }

    async fn fetch_optionable_symbols(&self) -> Result<OptionableSymbols> {
        let value = self.store.load_value(&self.store.options_path())?;
        let symbols = mapping::optionable_symbols_from_value(&value)?;
        info!("Options data loaded from local data directory: {} symbols", symbols.len());
        Ok(symbols)
    }

    async fn fetch_company_profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let value = self.store.load_value(&self.store.profile_path(symbol))?;
        let profile = mapping::company_profile_from_value(symbol, &value)?;
        info!("{} profile data loaded from local data directory.", symbol);
        Ok(profile)
    }
}
