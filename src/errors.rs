use thiserror::Error;
use std::num::ParseFloatError;

#[derive(Error, Debug)]
pub enum MoneyPressError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Parse float error: {0}")]
    ParseFloatError(#[from] ParseFloatError),

    // 历史数据点不足，无法计算窗口或趋势区间
    #[error("Insufficient data for {symbol}: need {needed} points, have {available}")]
    InsufficientData {
        symbol: String,
        needed: usize,
        available: usize,
    },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Missing record: {0}")]
    MissingRecord(String),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, MoneyPressError>;

// 用于从字符串创建错误
impl From<String> for MoneyPressError {
    fn from(s: String) -> Self {
        MoneyPressError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for MoneyPressError {
    fn from(s: &str) -> Self {
        MoneyPressError::Unknown(s.to_string())
    }
}
