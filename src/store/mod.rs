use log::{info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::errors::{Result, MoneyPressError};
use crate::models::analysis::PriceHistoryDocument;
use crate::models::earnings::EarningsCalendar;
use crate::models::options::OptionableSymbols;
use crate::models::profile::CompanyProfile;
use crate::util::json_utils;

pub const PRICE_HISTORY_DIR: &str = "price_history_by_symbol";
pub const PROFILE_DIR: &str = "by_symbol";
pub const EARNINGS_CALENDAR_FILE: &str = "earnings_calendar.json";
pub const OPTIONS_FILE: &str = "options.json";
pub const SUGGESTIONS_FILE: &str = "moneypress_suggestions.json";

/// 本地 JSON 数据目录。每次保存都是整体覆盖，同一文件的并发写入需由调用方串行化。
#[derive(Debug, Clone)]
pub struct DataStore {
    data_dir: PathBuf,
}

impl DataStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn price_history_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(PRICE_HISTORY_DIR).join(format!("{}.json", symbol))
    }

    pub fn profile_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(PROFILE_DIR).join(format!("{}.json", symbol))
    }

    pub fn earnings_calendar_path(&self) -> PathBuf {
        self.data_dir.join(EARNINGS_CALENDAR_FILE)
    }

    pub fn options_path(&self) -> PathBuf {
        self.data_dir.join(OPTIONS_FILE)
    }

    pub fn suggestions_path(&self) -> PathBuf {
        self.data_dir.join(SUGGESTIONS_FILE)
    }

    pub fn save_price_history(&self, symbol: &str, document: &PriceHistoryDocument) -> Result<()> {
        json_utils::save_json(document, &self.price_history_path(symbol))?;
        info!("Price history data for {} saved.", symbol);
        Ok(())
    }

    pub fn load_price_history(&self, symbol: &str) -> Result<PriceHistoryDocument> {
        let path = self.price_history_path(symbol);
        Self::require(&path)?;
        json_utils::load_json(&path)
    }

    pub fn save_company_profile(&self, profile: &CompanyProfile) -> Result<()> {
        json_utils::save_json(profile, &self.profile_path(&profile.symbol))?;
        info!("{} profile data saved.", profile.symbol);
        Ok(())
    }

    pub fn load_company_profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let path = self.profile_path(symbol);
        Self::require(&path)?;
        json_utils::load_json(&path)
    }

    pub fn save_earnings_calendar(&self, calendar: &EarningsCalendar) -> Result<()> {
        info!("Saving {} earnings events", calendar.len());
        json_utils::save_json(calendar, &self.earnings_calendar_path())
    }

    pub fn load_earnings_calendar(&self) -> Result<EarningsCalendar> {
        let path = self.earnings_calendar_path();
        Self::require(&path)?;
        json_utils::load_json(&path)
    }

    pub fn save_optionable_symbols(&self, symbols: &OptionableSymbols) -> Result<()> {
        info!("Saving {} weekly option symbols", symbols.len());
        json_utils::save_json(symbols, &self.options_path())
    }

    pub fn load_optionable_symbols(&self) -> Result<OptionableSymbols> {
        let path = self.options_path();
        Self::require(&path)?;
        json_utils::load_json(&path)
    }

    pub fn save_suggestions(&self, candidates: &EarningsCalendar) -> Result<()> {
        info!("Saving {} suggestions", candidates.len());
        json_utils::save_json(candidates, &self.suggestions_path())
    }

    pub fn load_suggestions(&self) -> Result<EarningsCalendar> {
        let path = self.suggestions_path();
        Self::require(&path)?;
        json_utils::load_json(&path)
    }

    /// 读取未经类型转换的 JSON，供按表头映射的宽松解析使用
    pub fn load_value(&self, path: &Path) -> Result<Value> {
        Self::require(path)?;
        json_utils::load_json(path)
    }

    fn require(path: &Path) -> Result<()> {
        if !path.exists() {
            warn!("{} doesn't exist.", path.display());
            return Err(MoneyPressError::SourceUnavailable(format!(
                "{} doesn't exist", path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::composite::{compute_analysis, DEFAULT_CLOSE_TREND_DAYS, DEFAULT_WINDOW_SIZE};
    use crate::models::earnings::EarningsEvent;
    use crate::models::price::tests::history_from_closes;
    use chrono::NaiveDate;

    #[test]
    fn test_price_history_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());

        let closes: Vec<f64> = (0..26).map(|v| 20.0 + (v % 7) as f64 * 0.37).collect();
        let mut history = history_from_closes("TXT", &closes).with_current_price(22.11);
        let analysis = compute_analysis(&mut history, DEFAULT_WINDOW_SIZE, &DEFAULT_CLOSE_TREND_DAYS).unwrap();
        let document = PriceHistoryDocument::new(&history, analysis.clone());

        store.save_price_history("TXT", &document).unwrap();
        let loaded = store.load_price_history("TXT").unwrap();

        assert_eq!(loaded, document);
        assert_eq!(loaded.analysis.price_history_score.to_bits(), analysis.price_history_score.to_bits());
        assert_eq!(loaded.analysis.close_trend_average.to_bits(), analysis.close_trend_average.to_bits());

        let restored = loaded.to_price_history("TXT");
        assert_eq!(restored.points, history.points);
        assert_eq!(restored.sma_data, history.sma_data);
    }

    #[test]
    fn test_document_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        let mut history = history_from_closes("GE", &[10.0; 21]);
        let analysis = compute_analysis(&mut history, 20, &[1, 3, 9]).unwrap();
        store.save_price_history("GE", &PriceHistoryDocument::new(&history, analysis)).unwrap();

        let raw: serde_json::Value = json_utils::load_json(&store.price_history_path("GE")).unwrap();
        for key in ["price_history_data", "current_price", "sma_data", "standard_deviation_data"] {
            assert!(raw["data"].get(key).is_some(), "missing data.{}", key);
        }
        for key in [
            "close_trend_days", "close_trend_data", "close_trend_average", "is_trend_positive",
            "is_close_greater_than_sma", "is_close_nearer_2_stdev", "price_history_score",
        ] {
            assert!(raw["analysis"].get(key).is_some(), "missing analysis.{}", key);
        }
        let first_key = history.points[0].timestamp().to_string();
        assert_eq!(raw["data"]["price_history_data"][&first_key]["Close"], 10.0);
    }

    #[test]
    fn test_calendar_and_options_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2021, 5, 3).unwrap();

        let calendar: EarningsCalendar =
            vec![EarningsEvent::new("AMBA", date, Some(0.5), Some(0.42), None)].into_iter().collect();
        let options: OptionableSymbols = [("AMBA", "AMBARELLA INC")].into_iter().collect();
        store.save_earnings_calendar(&calendar).unwrap();
        store.save_optionable_symbols(&options).unwrap();

        assert_eq!(store.load_earnings_calendar().unwrap(), calendar);
        assert_eq!(store.load_optionable_symbols().unwrap(), options);
    }

    #[test]
    fn test_company_profile_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        let mut profile = CompanyProfile::new("TXT", "Company").with_detail("Sector", "Industrials");
        profile.stamp(NaiveDate::from_ymd_opt(2021, 6, 9).unwrap().and_hms_opt(8, 15, 0).unwrap());

        store.save_company_profile(&profile).unwrap();

        assert!(dir.path().join("by_symbol").join("TXT.json").exists());
        assert_eq!(store.load_company_profile("TXT").unwrap(), profile);
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        assert!(matches!(
            store.load_price_history("NOPE"),
            Err(MoneyPressError::SourceUnavailable(_))
        ));
    }
}
