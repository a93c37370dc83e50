// 公开导出的模块，供外部使用
pub mod models;
pub mod analysis;
pub mod errors;
pub mod sources;
pub mod store;

// 为了支持主程序，暂时保持这些模块公开
// 但在库使用场景中，这些应该是内部模块
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod services;
#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::price::{PricePoint, PriceHistory};
pub use models::earnings::{EarningsEvent, EarningsCalendar, DateRange};
pub use models::options::OptionableSymbols;
pub use models::profile::CompanyProfile;
pub use models::analysis::AnalysisResult;
pub use analysis::{compute_analysis, compute_earnings_score, filter_candidates, prune_negative_surprises};
pub use sources::MarketDataSource;
pub use errors::{Result, MoneyPressError};
