use chrono::{DateTime, NaiveDate, NaiveTime};
use log::error;
use crate::errors::{Result, MoneyPressError};

/// 日期无法解析时返回的哨兵值
pub const INVALID_DATE_SENTINEL: i64 = -1;

// 表格中出现的日期格式：价格历史页为 "Jun 09, 2021"，财报日历为 "2021-06-09"
const TABLE_DATE_FORMATS: [&str; 2] = ["%b %d, %Y", "%Y-%m-%d"];

// 日期转换工具，按 UTC 零点计算
pub fn date_to_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

pub fn timestamp_to_date(timestamp: i64) -> Result<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|datetime| datetime.date_naive())
        .ok_or_else(|| MoneyPressError::InvalidDate(format!("timestamp out of range: {}", timestamp)))
}

pub fn parse_table_date(date_str: &str) -> Result<NaiveDate> {
    let trimmed = date_str.trim();
    TABLE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| MoneyPressError::InvalidDate(trimmed.to_string()))
}

/// 将表格日期转换为距 1970-01-01 的秒数，无法解析时记录错误并返回 [`INVALID_DATE_SENTINEL`]
pub fn convert_date_to_seconds(date_str: &str) -> i64 {
    match parse_table_date(date_str) {
        Ok(date) => date_to_timestamp(date),
        Err(e) => {
            error!("{}", e);
            INVALID_DATE_SENTINEL
        }
    }
}

/// 解析带符号的表格数值，例如 "+74.75"、"-5.2"、"1,024.5"。
/// 单独的 "-" 表示该列无数据，返回 `None`。
pub fn parse_signed_number(value: &str) -> Result<Option<f64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(None);
    }
    let cleaned = trimmed.trim_start_matches('+').replace(',', "");
    Ok(Some(cleaned.parse::<f64>()?))
}

// JSON 文件读写工具
pub mod json_utils {
    use super::*;
    use log::{debug, info};
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use std::fs;
    use std::path::Path;

    /// 完整序列化后一次性写入，先写临时文件再重命名，避免留下半截 JSON
    pub fn save_json<T: Serialize + ?Sized>(data: &T, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let body = serde_json::to_string_pretty(data)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, body)?;
        fs::rename(&tmp_path, path)?;

        info!("Saved {}", path.display());
        Ok(())
    }

    pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        debug!("Loading {}", path.display());
        let body = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_to_timestamp() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_timestamp(epoch), 0);

        let date = NaiveDate::from_ymd_opt(2021, 6, 9).unwrap();
        assert_eq!(date_to_timestamp(date), 1_623_196_800);
        assert_eq!(timestamp_to_date(1_623_196_800).unwrap(), date);
    }

    #[test]
    fn test_timestamp_before_epoch() {
        let date = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap();
        assert_eq!(date_to_timestamp(date), -86_400);
        // 当天内的任意秒数都落在同一天
        assert_eq!(timestamp_to_date(-1).unwrap(), date);
        assert_eq!(timestamp_to_date(1_623_196_800 + 86_399).unwrap(), NaiveDate::from_ymd_opt(2021, 6, 9).unwrap());
        assert!(matches!(timestamp_to_date(i64::MAX), Err(MoneyPressError::InvalidDate(_))));
    }

    #[test]
    fn test_parse_table_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 6, 9).unwrap();
        assert_eq!(parse_table_date("Jun 09, 2021").unwrap(), expected);
        assert_eq!(parse_table_date("2021-06-09").unwrap(), expected);
        assert!(matches!(parse_table_date("09/06/2021"), Err(MoneyPressError::InvalidDate(_))));
    }

    #[test]
    fn test_convert_date_to_seconds_sentinel() {
        assert_eq!(convert_date_to_seconds("Jan 01, 1970"), 0);
        assert_eq!(convert_date_to_seconds("not a date"), INVALID_DATE_SENTINEL);
    }

    #[test]
    fn test_parse_signed_number() {
        assert_eq!(parse_signed_number("+74.75").unwrap(), Some(74.75));
        assert_eq!(parse_signed_number("-5.2").unwrap(), Some(-5.2));
        assert_eq!(parse_signed_number("1,024.5").unwrap(), Some(1024.5));
        assert_eq!(parse_signed_number("-").unwrap(), None);
        assert!(parse_signed_number("abc").is_err());
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("values.json");
        let values = vec![0.2_f64, 0.4, 1.0 / 3.0];

        json_utils::save_json(&values, &path).unwrap();
        let loaded: Vec<f64> = json_utils::load_json(&path).unwrap();

        assert_eq!(loaded, values);
        assert!(!path.with_extension("json.tmp").exists());
    }
}
