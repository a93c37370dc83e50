pub mod statistics;
pub mod trend;
pub mod composite;
pub mod earnings;
pub mod candidates;

pub use candidates::{filter_candidates, prune_negative_surprises};
pub use composite::compute_analysis;
pub use earnings::compute_earnings_score;
