use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::errors::{Result, MoneyPressError};
use crate::util;

/// 日线价格数据，字段名沿用价格历史表格的列名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Adj Close")]
    pub adj_close: f64,
    #[serde(rename = "Volume")]
    pub volume: i64,
}

impl PricePoint {
    /// 当日 UTC 零点距 1970-01-01 的秒数
    pub fn timestamp(&self) -> i64 {
        util::date_to_timestamp(self.date)
    }
}

/// 单个股票的价格历史，按日期升序排列，每个交易日一条
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    pub symbol: String,
    pub points: Vec<PricePoint>,
    pub current_price: Option<f64>,
    pub sma_data: BTreeMap<i64, f64>,
    pub standard_deviation_data: BTreeMap<i64, f64>,
}

impl PriceHistory {
    pub fn new(symbol: &str, points: Vec<PricePoint>) -> Self {
        let mut history = Self {
            symbol: symbol.to_string(),
            ..Default::default()
        };
        for point in points {
            history.upsert(point);
        }
        history
    }

    /// 插入或覆盖一个交易日的数据，保持日期升序
    pub fn upsert(&mut self, point: PricePoint) {
        match self.points.binary_search_by(|p| p.date.cmp(&point.date)) {
            Ok(idx) => {
                warn!("{} already has a record for {}, overwriting", self.symbol, point.date);
                self.points[idx] = point;
            }
            Err(idx) => self.points.insert(idx, point),
        }
    }

    pub fn with_current_price(mut self, price: f64) -> Self {
        self.current_price = Some(price);
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// 计算并保存滚动 SMA 与标准差
    pub fn apply_statistics(&mut self, window: usize) {
        let stats = crate::analysis::statistics::rolling_statistics(&self.points, window);
        self.sma_data = stats.sma;
        self.standard_deviation_data = stats.stdev;
    }

    pub fn sma_at(&self, timestamp: i64) -> Option<f64> {
        self.sma_data.get(&timestamp).copied()
    }

    pub fn stdev_at(&self, timestamp: i64) -> Option<f64> {
        self.standard_deviation_data.get(&timestamp).copied()
    }

    /// 按日期字符串查询 SMA；日期无法解析时返回 `InvalidDate`，无记录时返回 `MissingRecord`
    pub fn simple_moving_average(&self, day: &str) -> Result<f64> {
        let date = util::parse_table_date(day)?;
        self.sma_at(util::date_to_timestamp(date)).ok_or_else(|| {
            MoneyPressError::MissingRecord(format!("{}: no SMA for {}", self.symbol, date))
        })
    }

    pub fn standard_deviation(&self, day: &str) -> Result<f64> {
        let date = util::parse_table_date(day)?;
        self.stdev_at(util::date_to_timestamp(date)).ok_or_else(|| {
            MoneyPressError::MissingRecord(format!("{}: no standard deviation for {}", self.symbol, date))
        })
    }
}
