use log::{debug, info};
use crate::analysis::trend;
use crate::errors::{Result, MoneyPressError};
use crate::models::analysis::AnalysisResult;
use crate::models::price::PriceHistory;

// 评分权重，与既有筛选结果保持一致，不可调整
pub const TREND_WEIGHT: u32 = 1;
pub const SMA_WEIGHT: u32 = 2;
pub const STDEV_WEIGHT: u32 = 2;
pub const TOTAL_WEIGHT: u32 = TREND_WEIGHT + SMA_WEIGHT + STDEV_WEIGHT;

/// 收盘价需超过 SMA + 2σ 的这一比例才算"接近 2 倍标准差"
pub const PERCENT_OF_2_STDEV: f64 = 0.66;

pub const DEFAULT_WINDOW_SIZE: usize = 20;
pub const DEFAULT_CLOSE_TREND_DAYS: [usize; 3] = [1, 3, 9];

pub fn is_close_greater_than_sma(last_close: f64, last_sma: f64) -> bool {
    last_close > last_sma
}

pub fn is_close_nearer_2_stdev(last_close: f64, last_sma: f64, last_stdev: f64) -> bool {
    let stdev_threshold_price = last_sma + last_stdev * 2.0 * PERCENT_OF_2_STDEV;
    last_close > stdev_threshold_price
}

/// (1*趋势 + 2*高于SMA + 2*接近2σ) / 5
pub fn price_history_score(is_trend_positive: bool, is_above_sma: bool, is_near_2_stdev: bool) -> f64 {
    let weighted = TREND_WEIGHT * is_trend_positive as u32
        + SMA_WEIGHT * is_above_sma as u32
        + STDEV_WEIGHT * is_near_2_stdev as u32;
    weighted as f64 / TOTAL_WEIGHT as f64
}

/// 对价格历史运行完整分析：滚动统计 → 趋势 → 价格检查 → 综合评分。
/// 计算结果中的 SMA 与标准差会写回 `history`。
pub fn compute_analysis(
    history: &mut PriceHistory,
    window_size: usize,
    trend_days: &[usize],
) -> Result<AnalysisResult> {
    info!("Analyzing {} ({} price points)", history.symbol, history.len());

    history.apply_statistics(window_size);

    let last = history.last().cloned().ok_or_else(|| MoneyPressError::InsufficientData {
        symbol: history.symbol.clone(),
        needed: window_size.max(1),
        available: 0,
    })?;
    let last_key = last.timestamp();

    let (last_sma, last_stdev) = match (history.sma_at(last_key), history.stdev_at(last_key)) {
        (Some(sma), Some(stdev)) => (sma, stdev),
        _ => {
            return Err(MoneyPressError::InsufficientData {
                symbol: history.symbol.clone(),
                needed: window_size,
                available: history.len(),
            })
        }
    };

    let trend = trend::close_trend(history, trend_days)?;
    let above_sma = is_close_greater_than_sma(last.close, last_sma);
    let near_2_stdev = is_close_nearer_2_stdev(last.close, last_sma, last_stdev);
    let score = price_history_score(trend.is_positive, above_sma, near_2_stdev);

    debug!(
        "{}: trend positive {}, close > SMA {}, close near 2 stdev {}",
        history.symbol, trend.is_positive, above_sma, near_2_stdev
    );
    info!("{} price history score is {}", history.symbol, score);

    Ok(AnalysisResult {
        close_trend_days: trend_days.to_vec(),
        close_trend_data: trend.slopes,
        close_trend_average: trend.average,
        is_trend_positive: trend.is_positive,
        is_close_greater_than_sma: above_sma,
        is_close_nearer_2_stdev: near_2_stdev,
        price_history_score: score,
    })
}
