//! Rolling simple moving average and population standard deviation.

use std::collections::BTreeMap;
use crate::models::price::PricePoint;

/// 以窗口末端时间戳为键的滚动统计结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollingStatistics {
    pub sma: BTreeMap<i64, f64>,
    pub stdev: BTreeMap<i64, f64>,
}

impl RollingStatistics {
    pub fn len(&self) -> usize {
        self.sma.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sma.is_empty()
    }
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// 总体标准差（除以 N）
pub fn population_stdev(values: &[f64]) -> f64 {
    let mid = mean(values);
    let variance = values.iter()
        .map(|&x| (x - mid).powi(2))
        .sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// 从最近一个点向前滑动窗口，对每个窗口 (i-W, i] 计算均值和总体标准差，
/// 剩余点数不足一个窗口时停止。`points` 须按日期升序排列。
pub fn rolling_statistics(points: &[PricePoint], window: usize) -> RollingStatistics {
    let mut stats = RollingStatistics::default();
    if window == 0 || points.len() < window {
        return stats;
    }

    let closes: Vec<f64> = points.iter().map(|p| p.close).collect();
    for end in (window - 1..closes.len()).rev() {
        let values = &closes[end + 1 - window..=end];
        let key = points[end].timestamp();
        stats.sma.insert(key, mean(values));
        stats.stdev.insert(key, population_stdev(values));
    }

    stats
}
