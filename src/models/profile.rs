use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// "Last Updated" 字段的格式，精确到分钟
pub const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M";

pub const STOCK_TYPE_COMPANY: &str = "Company";
pub const STOCK_TYPE_ETF: &str = "ETF";

/// 公司或 ETF 的资料与行情摘要。固定字段之外的标签（Sector、Industry、
/// Market Cap、PE Ratio、Category、Fund Family 等）原样保存在 `details` 中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Stock Type", default = "default_stock_type")]
    pub stock_type: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(
        rename = "Last Updated",
        default,
        with = "last_updated_format",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub details: BTreeMap<String, Value>,
}

fn default_stock_type() -> String {
    STOCK_TYPE_COMPANY.to_string()
}

impl CompanyProfile {
    pub fn new(symbol: &str, stock_type: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            stock_type: stock_type.to_string(),
            description: String::new(),
            last_updated: None,
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, label: &str, value: &str) -> Self {
        self.details.insert(label.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn is_etf(&self) -> bool {
        self.stock_type == STOCK_TYPE_ETF
    }

    pub fn detail(&self, label: &str) -> Option<&str> {
        self.details.get(label).and_then(|v| v.as_str())
    }

    /// 记录更新时间，秒以下部分丢弃以便与保存格式一致
    pub fn stamp(&mut self, now: NaiveDateTime) {
        let truncated = now.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(now);
        self.last_updated = Some(truncated);
    }

    /// 没有更新时间，或距今已满 `refresh_days` 天
    pub fn is_stale(&self, now: NaiveDateTime, refresh_days: i64) -> bool {
        match self.last_updated {
            Some(updated) => (now - updated).num_days() >= refresh_days,
            None => true,
        }
    }
}

mod last_updated_format {
    use super::LAST_UPDATED_FORMAT;
    use chrono::NaiveDateTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(t) => serializer.serialize_str(&t.format(LAST_UPDATED_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => NaiveDateTime::parse_from_str(&text, LAST_UPDATED_FORMAT)
                .map(Some)
                .map_err(D::Error::custom),
            None => Ok(None),
        }
    }
}
