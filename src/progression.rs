//! Passive income over time: the periodic tick and offline catch-up.
//!
//! Both paths go through [`logic::apply_elapsed`] so a second online and a
//! second offline are worth the same.

use crate::economy::{logic, EconomyState};

/// Offline income is granted for at most this many hours.
pub const OFFLINE_CAP_HOURS: f64 = 12.0;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Gold credited when a snapshot is loaded after time away.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OfflineGain {
    pub amount: f64,
    /// Real time since the last save, uncapped.
    pub hours_elapsed: f64,
    /// Time actually paid out, capped.
    pub hours_applied: f64,
}

/// One periodic tick of `seconds`. Returns the gold gained.
pub fn tick(state: &mut EconomyState, seconds: f64) -> f64 {
    let cps = state.cps();
    logic::apply_elapsed(state, seconds, cps)
}

/// Credit income for the time between `last_saved` and `now` (both wall-clock
/// seconds), clamped to `[0, cap_hours]`. Uses the CPS of the state as loaded.
pub fn offline_catch_up(
    state: &mut EconomyState,
    last_saved: Option<f64>,
    now: f64,
    cap_hours: f64,
) -> OfflineGain {
    let elapsed = match last_saved {
        Some(saved) if saved.is_finite() && now.is_finite() => (now - saved).max(0.0),
        _ => 0.0,
    };
    let cap = cap_hours.max(0.0) * SECONDS_PER_HOUR;
    let applied = elapsed.min(cap);
    let cps = state.cps();
    let amount = logic::apply_elapsed(state, applied, cps);
    OfflineGain {
        amount,
        hours_elapsed: elapsed / SECONDS_PER_HOUR,
        hours_applied: applied / SECONDS_PER_HOUR,
    }
}
