use crate::errors::{Result, MoneyPressError};
use crate::models::earnings::{DateRange, EarningsCalendar};
use crate::models::options::OptionableSymbols;
use crate::models::price::PriceHistory;
use crate::models::profile::CompanyProfile;
use crate::sources::base::MarketDataSource;
use crate::sources::mapping;
use crate::store::{EARNINGS_CALENDAR_FILE, OPTIONS_FILE, PRICE_HISTORY_DIR, PROFILE_DIR};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde_json::Value;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// 从 HTTP 镜像读取抓取程序导出的 JSON 数据，目录结构与本地数据目录相同
pub struct RemoteDataSource {
    client: Client,
    base_url: String,
    last_request: Mutex<Option<Instant>>,
}

impl RemoteDataSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(MoneyPressError::RequestError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            last_request: Mutex::new(None),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// 等待请求频率限制
    async fn wait_for_rate_limit(&self) {
        const MIN_INTERVAL: Duration = Duration::from_millis(500);

        let now = Instant::now();
        let should_wait = {
            let mut last = match self.last_request.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let should_wait = last
                .as_ref()
                .map(|instant| instant.elapsed())
                .filter(|elapsed| *elapsed < MIN_INTERVAL)
                .map(|elapsed| MIN_INTERVAL - elapsed);
            *last = Some(now);
            should_wait
        };

        if let Some(wait_time) = should_wait {
            debug!("Waiting {:?} for rate limit", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }

    async fn fetch_json(&self, path: &str) -> Result<Value> {
        self.wait_for_rate_limit().await;

        let url = self.url_for(path);
        debug!("GET {}", url);
        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| MoneyPressError::SourceUnavailable(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(MoneyPressError::SourceUnavailable(format!(
                "{}: HTTP status {}", url, response.status()
            )));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl MarketDataSource for RemoteDataSource {
    fn source_name(&self) -> &'static str {
        "remote"
    }

    async fn fetch_price_history(&self, symbol: &str) -> Result<PriceHistory> {
        let value = self.fetch_json(&format!("{}/{}.json", PRICE_HISTORY_DIR, symbol)).await?;
        let history = mapping::price_history_from_value(symbol, &value)?;
        debug!("Fetched {} price points for {}", history.len(), symbol);
        Ok(history)
    }

    async fn fetch_earnings_calendar(&self, range: &DateRange) -> Result<EarningsCalendar> {
        let value = self.fetch_json(EARNINGS_CALENDAR_FILE).await?;
        let calendar = mapping::earnings_calendar_from_value(&value, range)?;
        info!("Fetched {} earnings events from {}", calendar.len(), self.base_url);
        Ok(calendar)
    }

    async fn fetch_optionable_symbols(&self) -> Result<OptionableSymbols> {
        let value = self.fetch_json(OPTIONS_FILE).await?;
        let symbols = mapping::optionable_symbols_from_value(&value)?;
        info!("Scrape returned {} weekly option records.", symbols.len());
        Ok(symbols)
    }

    async fn fetch_company_profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let value = self.fetch_json(&format!("{}/{}.json", PROFILE_DIR, symbol)).await?;
        mapping::company_profile_from_value(symbol, &value)
    }
}
