use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::models::price::{PriceHistory, PricePoint};

/// 价格历史分析结果，每次运行重新计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub close_trend_days: Vec<usize>,
    pub close_trend_data: Vec<f64>,
    pub close_trend_average: f64,
    pub is_trend_positive: bool,
    pub is_close_greater_than_sma: bool,
    pub is_close_nearer_2_stdev: bool,
    pub price_history_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryData {
    pub price_history_data: BTreeMap<i64, PricePoint>,
    pub current_price: Option<f64>,
    pub sma_data: BTreeMap<i64, f64>,
    pub standard_deviation_data: BTreeMap<i64, f64>,
}

/// price_history_by_symbol/<SYMBOL>.json 的文件结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryDocument {
    pub data: PriceHistoryData,
    pub analysis: AnalysisResult,
}

impl PriceHistoryDocument {
    pub fn new(history: &PriceHistory, analysis: AnalysisResult) -> Self {
        let price_history_data = history
            .points
            .iter()
            .map(|p| (p.timestamp(), p.clone()))
            .collect();

        Self {
            data: PriceHistoryData {
                price_history_data,
                current_price: history.current_price,
                sma_data: history.sma_data.clone(),
                standard_deviation_data: history.standard_deviation_data.clone(),
            },
            analysis,
        }
    }

    /// 还原为价格历史（含已计算的 SMA 与标准差）
    pub fn to_price_history(&self, symbol: &str) -> PriceHistory {
        let mut history = PriceHistory::new(
            symbol,
            self.data.price_history_data.values().cloned().collect(),
        );
        history.current_price = self.data.current_price;
        history.sma_data = self.data.sma_data.clone();
        history.standard_deviation_data = self.data.standard_deviation_data.clone();
        history
    }
}
