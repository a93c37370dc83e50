//! Converts header-keyed records exported by the page scraper into typed
//! records. Cells may be JSON numbers or the raw table text ("1,024.50",
//! "+12.3", "-").

use log::{error, warn};
use serde_json::Value;

use crate::errors::{Result, MoneyPressError};
use crate::models::earnings::{DateRange, EarningsCalendar, EarningsEvent};
use crate::models::options::OptionableSymbols;
use crate::models::price::{PriceHistory, PricePoint};
use crate::models::profile::{CompanyProfile, LAST_UPDATED_FORMAT};
use crate::util;

fn cell<'a>(record: &'a Value, column: &str) -> Result<&'a Value> {
    record
        .get(column)
        .ok_or_else(|| MoneyPressError::MissingRecord(format!("column {} not found", column)))
}

fn optional_number(record: &Value, column: &str) -> Result<Option<f64>> {
    match cell(record, column)? {
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => util::parse_signed_number(s),
        Value::Null => Ok(None),
        other => Err(MoneyPressError::DataError(format!("{}: unexpected value {}", column, other))),
    }
}

fn number(record: &Value, column: &str) -> Result<f64> {
    optional_number(record, column)?
        .ok_or_else(|| MoneyPressError::DataError(format!("{}: no value", column)))
}

fn text(record: &Value, column: &str) -> String {
    record.get(column).and_then(|v| v.as_str()).unwrap_or_default().to_string()
}

fn date(record: &Value, column: &str) -> Result<chrono::NaiveDate> {
    let raw = cell(record, column)?
        .as_str()
        .ok_or_else(|| MoneyPressError::InvalidDate(format!("{} is not a string", column)))?;
    util::parse_table_date(raw)
}

pub fn price_point_from_record(record: &Value) -> Result<PricePoint> {
    Ok(PricePoint {
        date: date(record, "Date")?,
        open: number(record, "Open")?,
        high: number(record, "High")?,
        low: number(record, "Low")?,
        close: number(record, "Close")?,
        adj_close: number(record, "Adj Close")?,
        volume: number(record, "Volume")? as i64,
    })
}

/// 解析价格历史。接受完整的 `{data: {price_history_data, current_price}}` 文档，
/// 或仅有 `price_history_data` 映射。无法解析的行记录日志后跳过。
pub fn price_history_from_value(symbol: &str, value: &Value) -> Result<PriceHistory> {
    let data = value.get("data").unwrap_or(value);
    let rows = data
        .get("price_history_data")
        .unwrap_or(data)
        .as_object()
        .ok_or_else(|| MoneyPressError::DataError(format!("{}: price history is not an object", symbol)))?;

    let mut points = Vec::with_capacity(rows.len());
    for (key, record) in rows {
        match price_point_from_record(record) {
            Ok(point) => points.push(point),
            Err(e @ MoneyPressError::InvalidDate(_)) => error!("{} row {}: {}", symbol, key, e),
            Err(e) => warn!("{} row {} skipped: {}", symbol, key, e),
        }
    }

    let mut history = PriceHistory::new(symbol, points);
    if let Some(price) = data.get("current_price") {
        history.current_price = match price {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => util::parse_signed_number(s).ok().flatten(),
            _ => None,
        };
    }
    Ok(history)
}

pub fn earnings_event_from_record(symbol: &str, record: &Value) -> Result<EarningsEvent> {
    let mut event = EarningsEvent::new(
        symbol,
        date(record, "Earnings Date")?,
        optional_number(record, "Reported EPS")?,
        optional_number(record, "EPS Estimate")?,
        optional_number(record, "Surprise(%)")?,
    );
    event.company = text(record, "Company");
    event.earnings_call_time = text(record, "Earnings Call Time");
    Ok(event)
}

/// 解析财报日历中的全部事件
pub fn earnings_events_from_value(value: &Value) -> Result<EarningsCalendar> {
    let rows = value
        .as_object()
        .ok_or_else(|| MoneyPressError::DataError("earnings calendar is not an object".to_string()))?;

    let mut calendar = EarningsCalendar::new();
    for (symbol, record) in rows {
        match earnings_event_from_record(symbol, record) {
            Ok(event) => calendar.insert(event),
            Err(e @ MoneyPressError::InvalidDate(_)) => error!("{}: {}", symbol, e),
            Err(e) => warn!("{} skipped: {}", symbol, e),
        }
    }
    Ok(calendar)
}

/// 解析财报日历，仅保留财报日期在 `range` 内的事件
pub fn earnings_calendar_from_value(value: &Value, range: &DateRange) -> Result<EarningsCalendar> {
    let mut calendar = earnings_events_from_value(value)?;
    calendar.retain(|event| range.contains(event.earnings_date));
    Ok(calendar)
}

pub fn optionable_symbols_from_value(value: &Value) -> Result<OptionableSymbols> {
    let rows = value
        .as_object()
        .ok_or_else(|| MoneyPressError::DataError("options list is not an object".to_string()))?;

    let mut symbols = OptionableSymbols::new();
    for (symbol, record) in rows {
        symbols.insert(symbol, &text(record, "company name"));
    }
    Ok(symbols)
}

/// 解析公司资料。缺少 "Symbol" 时补上；"Last Updated" 无法解析时丢弃，视为需要刷新。
pub fn company_profile_from_value(symbol: &str, value: &Value) -> Result<CompanyProfile> {
    let mut record = value
        .as_object()
        .cloned()
        .ok_or_else(|| MoneyPressError::DataError(format!("{}: profile is not an object", symbol)))?;

    record
        .entry("Symbol")
        .or_insert_with(|| Value::String(symbol.to_string()));

    let bad_timestamp = match record.get("Last Updated") {
        Some(Value::String(raw)) => chrono::NaiveDateTime::parse_from_str(raw, LAST_UPDATED_FORMAT).is_err(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    };
    if bad_timestamp {
        if let Some(raw) = record.remove("Last Updated") {
            warn!("{}: ignoring Last Updated {}", symbol, raw);
        }
    }

    Ok(serde_json::from_value(Value::Object(record))?)
}
