use std::error::Error;
use std::fs;
use std::path::Path;
use chrono::NaiveDate;
use moneypress::store::{DataStore, PRICE_HISTORY_DIR};

// 列出每个已保存股票的最新价格日期，以及全部数据中最新的交易日
fn main() -> Result<(), Box<dyn Error>> {
    let data_dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let store = DataStore::new(&data_dir);

    let history_dir = Path::new(&data_dir).join(PRICE_HISTORY_DIR);
    if !history_dir.exists() {
        return Err(format!("{} 不存在，请先运行 'moneypress screen'", history_dir.display()).into());
    }

    let mut latest_date: Option<NaiveDate> = None;

    for entry in fs::read_dir(&history_dir)? {
        let path = entry?.path();
        let symbol = match path.file_stem().and_then(|s| s.to_str()) {
            Some(symbol) if path.extension().is_some_and(|e| e == "json") => symbol.to_string(),
            _ => continue,
        };

        let document = match store.load_price_history(&symbol) {
            Ok(document) => document,
            Err(e) => {
                println!("{}: 无法读取 ({})", symbol, e);
                continue;
            }
        };

        let history = document.to_price_history(&symbol);
        if let Some(point) = history.last() {
            println!("{:<8} {}  score {}", symbol, point.date, document.analysis.price_history_score);
            if latest_date.map_or(true, |d| point.date > d) {
                latest_date = Some(point.date);
            }
        }
    }

    match latest_date {
        Some(date) => println!("最新交易日期: {}", date),
        None => println!("未找到有效的日期"),
    }

    Ok(())
}
