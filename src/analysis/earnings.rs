use chrono::NaiveDate;
use log::warn;
use crate::models::earnings::EarningsEvent;

/// 距财报发布的整天数。财报日期晚于今天时记录警告并返回 0。
pub fn days_since_earnings(earnings_date: NaiveDate, today: NaiveDate) -> i64 {
    let days = (today - earnings_date).num_days();
    if days < 0 {
        warn!("Earnings date {} is after {}, using 0 days", earnings_date, today);
        return 0;
    }
    days
}

/// 惊喜幅度得分。负的惊喜与小于 10% 的正惊喜同样记 0 分。
pub fn surprise_score(surprise_percent: Option<f64>) -> f64 {
    match surprise_percent {
        Some(s) if s >= 20.0 => 100.0,
        Some(s) if s >= 10.0 => 75.0,
        _ => 0.0,
    }
}

/// 时效得分，恰好第 5 天落入默认档
pub fn recency_score(days_since: i64) -> f64 {
    if days_since < 5 {
        100.0
    } else if days_since > 5 && days_since <= 10 {
        75.0
    } else {
        50.0
    }
}

pub fn earnings_score(surprise_percent: Option<f64>, days_since: i64) -> f64 {
    (surprise_score(surprise_percent) + recency_score(days_since)) / 2.0
}

pub fn compute_earnings_score(event: &EarningsEvent, today: NaiveDate) -> f64 {
    earnings_score(event.surprise_percent, days_since_earnings(event.earnings_date, today))
}
