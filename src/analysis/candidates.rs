use log::{debug, info};
use crate::models::earnings::{EarningsCalendar, EarningsEvent};
use crate::models::options::OptionableSymbols;

/// 报告 EPS 低于该值且惊喜为负的候选会被剔除
pub const MIN_REPORTED_EPS: f64 = 0.10;

/// 保留代码出现在周期权列表中的财报事件
pub fn filter_candidates(events: &EarningsCalendar, optionable: &OptionableSymbols) -> EarningsCalendar {
    let candidates: EarningsCalendar = events
        .iter()
        .filter(|event| optionable.contains(&event.symbol))
        .cloned()
        .collect();

    info!(
        "{} of {} earnings events have weekly options",
        candidates.len(),
        events.len()
    );
    candidates
}

/// 负惊喜且 EPS 偏低时返回 true。惊喜缺失，或负惊喜但 EPS 缺失时无法判断，同样返回 true；
/// 惊喜非负时不看 EPS。
pub fn is_negative_surprise(event: &EarningsEvent) -> bool {
    match (event.surprise_percent, event.reported_eps) {
        (Some(surprise), _) if surprise >= 0.0 => false,
        (Some(_), Some(eps)) => eps < MIN_REPORTED_EPS,
        _ => true,
    }
}

/// 剔除负惊喜候选，返回剔除数量
pub fn prune_negative_surprises(candidates: &mut EarningsCalendar) -> usize {
    let before = candidates.len();
    candidates.retain(|event| {
        let drop = is_negative_surprise(event);
        if drop {
            debug!("Removing {} (surprise {:?}, reported EPS {:?})",
                   event.symbol, event.surprise_percent, event.reported_eps);
        }
        !drop
    });

    let removed = before - candidates.len();
    info!("Updated record count after removing negative surprises: {}", candidates.len());
    removed
}
