use log::debug;
use crate::errors::{Result, MoneyPressError};
use crate::models::price::PriceHistory;

/// 多区间收盘价斜率
#[derive(Debug, Clone, PartialEq)]
pub struct CloseTrend {
    pub slopes: Vec<f64>,
    pub average: f64,
    pub is_positive: bool,
}

/// 计算收盘价趋势。`trend_days` 为相对最近一个点的累计偏移，
/// 例如 [1, 3, 9] 对应 0-1、1-3、3-9 三个区间。
pub fn close_trend(history: &PriceHistory, trend_days: &[usize]) -> Result<CloseTrend> {
    if trend_days.is_empty() {
        return Err(MoneyPressError::DataError(format!(
            "{}: no close trend ranges configured", history.symbol
        )));
    }

    let points = &history.points;
    let max_offset = trend_days.iter().copied().max().unwrap_or_default();
    if points.is_empty() || max_offset > points.len() - 1 {
        return Err(MoneyPressError::InsufficientData {
            symbol: history.symbol.clone(),
            needed: max_offset + 1,
            available: points.len(),
        });
    }

    let last = points.len() - 1;
    let mut near = last;
    let mut slopes = Vec::with_capacity(trend_days.len());

    for &offset in trend_days {
        let far = last - offset;
        let x_near = points[near].timestamp();
        let x_far = points[far].timestamp();
        if x_far == x_near {
            return Err(MoneyPressError::DataError(format!(
                "{}: empty trend range ending at offset {}", history.symbol, offset
            )));
        }

        // m = (y2 - y1) / (x2 - x1)
        let slope = (points[far].close - points[near].close) / (x_far - x_near) as f64;
        slopes.push(slope);
        near = far;
    }

    let average = slopes.iter().sum::<f64>() / slopes.len() as f64;
    debug!("{} close trend slopes: {:?}, average {}", history.symbol, slopes, average);

    Ok(CloseTrend {
        slopes,
        average,
        is_positive: average > 0.0,
    })
}
