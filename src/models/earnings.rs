use chrono::{Duration, NaiveDate};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::analysis::earnings as scorer;

/// 单个股票的财报事件，字段名沿用财报日历表格的列名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsEvent {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Company", default)]
    pub company: String,
    #[serde(rename = "Earnings Call Time", default)]
    pub earnings_call_time: String,
    // 以下三列在表格中可能为 "-"
    #[serde(rename = "EPS Estimate", with = "dash_sentinel")]
    pub eps_estimate: Option<f64>,
    #[serde(rename = "Reported EPS", with = "dash_sentinel")]
    pub reported_eps: Option<f64>,
    #[serde(rename = "Surprise(%)", with = "dash_sentinel")]
    pub surprise_percent: Option<f64>,
    #[serde(rename = "Earnings Date")]
    pub earnings_date: NaiveDate,
    #[serde(default)]
    pub days_since_earnings: i64,
    #[serde(default)]
    pub earnings_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_history_score: Option<f64>,
}

impl EarningsEvent {
    pub fn new(
        symbol: &str,
        earnings_date: NaiveDate,
        reported_eps: Option<f64>,
        eps_estimate: Option<f64>,
        surprise_percent: Option<f64>,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            company: String::new(),
            earnings_call_time: String::new(),
            eps_estimate,
            reported_eps,
            surprise_percent,
            earnings_date,
            days_since_earnings: 0,
            earnings_score: 0.0,
            price_history_score: None,
        }
    }

    pub fn with_company(mut self, company: &str) -> Self {
        self.company = company.to_string();
        self
    }

    /// 按给定的"今天"重新计算距财报天数和财报得分
    pub fn refresh_scores(&mut self, today: NaiveDate) {
        self.days_since_earnings = scorer::days_since_earnings(self.earnings_date, today);
        self.earnings_score = scorer::earnings_score(self.surprise_percent, self.days_since_earnings);
    }
}

/// 按股票代码索引的财报日历。同一代码后抓取的事件覆盖先前的，并记录警告。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EarningsCalendar {
    events: BTreeMap<String, EarningsEvent>,
}

impl EarningsCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event: EarningsEvent) {
        if let Some(previous) = self.events.get(&event.symbol) {
            warn!(
                "{} exists, {:?} data overwritten by {:?}",
                event.symbol, previous, event
            );
        }
        self.events.insert(event.symbol.clone(), event);
    }

    pub fn get(&self, symbol: &str) -> Option<&EarningsEvent> {
        self.events.get(symbol)
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut EarningsEvent> {
        self.events.get_mut(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.events.contains_key(symbol)
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&EarningsEvent) -> bool,
    {
        self.events.retain(|_, event| keep(event));
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.events.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EarningsEvent> {
        self.events.values()
    }

    /// 并入较新的事件，同一代码以 `newer` 为准
    pub fn merge(&mut self, newer: EarningsCalendar) {
        self.events.extend(newer.events);
    }

    pub fn refresh_scores(&mut self, today: NaiveDate) {
        for event in self.events.values_mut() {
            event.refresh_scores(today);
        }
    }
}

impl FromIterator<EarningsEvent> for EarningsCalendar {
    fn from_iter<I: IntoIterator<Item = EarningsEvent>>(iter: I) -> Self {
        let mut calendar = EarningsCalendar::new();
        for event in iter {
            calendar.insert(event);
        }
        calendar
    }
}

/// 闭区间日期范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// 今天以及之前的 `days - 1` 个自然日
    pub fn days_in_past(today: NaiveDate, days: usize) -> Self {
        let span = days.saturating_sub(1) as i64;
        Self::new(today - Duration::days(span), today)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// 从最近一天开始倒序列出范围内的每一天
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut day = self.end;
        while day >= self.start {
            days.push(day);
            day = day - Duration::days(1);
        }
        days
    }
}

// "-" 与 None 之间的转换
mod dash_sentinel {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    const SENTINEL: &str = "-";

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_f64(*v),
            None => serializer.serialize_str(SENTINEL),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(Some(v)),
            Raw::Text(text) => crate::util::parse_signed_number(&text).map_err(D::Error::custom),
        }
    }
}
