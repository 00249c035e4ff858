//! Fixed-timestep progression clock using an accumulator pattern, plus the
//! wall clock used for snapshot timestamps.
//!
//! The host calls [`GameTime::update`] at whatever rate it renders. GameTime
//! converts that into whole periodic ticks, keeping economy ticks
//! deterministic and testable.

pub struct GameTime {
    /// Milliseconds per tick (1000ms = one economy tick per second).
    ms_per_tick: f64,
    /// Largest gap between two updates that is still turned into ticks.
    max_frame_gap_ms: f64,
    /// Accumulated milliseconds not yet consumed as ticks.
    accumulator: f64,
    /// Total elapsed ticks since creation.
    pub total_ticks: u64,
    /// Timestamp of the last update (ms), None before the first frame.
    last_timestamp: Option<f64>,
}

impl GameTime {
    pub fn new(ms_per_tick: f64, max_frame_gap_ms: f64) -> Self {
        Self {
            ms_per_tick: ms_per_tick.max(1.0),
            max_frame_gap_ms: max_frame_gap_ms.max(0.0),
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed a monotonic timestamp in milliseconds.
    /// Returns the number of periodic ticks to run now.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            // A long pause (suspended tab) is not paid out here; offline
            // catch-up on load handles real absences.
            Some(prev) => (now_ms - prev).clamp(0.0, self.max_frame_gap_ms),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }
}

/// Seconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn wall_clock_secs() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Seconds since the Unix epoch. `SystemTime::now()` panics on
/// wasm32-unknown-unknown, so ask the browser.
#[cfg(target_arch = "wasm32")]
pub fn wall_clock_secs() -> f64 {
    js_sys::Date::now() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_runs_nothing() {
        let mut gt = GameTime::new(1000.0, 5000.0);
        assert_eq!(gt.update(0.0), 0);
    }

    #[test]
    fn whole_seconds_become_ticks() {
        let mut gt = GameTime::new(1000.0, 5000.0);
        gt.update(0.0);
        assert_eq!(gt.update(1000.0), 1);
        assert_eq!(gt.total_ticks, 1);
    }

    #[test]
    fn partial_second_carries_over() {
        let mut gt = GameTime::new(1000.0, 5000.0);
        gt.update(0.0);
        assert_eq!(gt.update(1500.0), 1);
        assert_eq!(gt.update(2000.0), 1); // 500ms left over + 500ms
        assert_eq!(gt.total_ticks, 2);
    }

    #[test]
    fn background_gap_is_clamped() {
        let mut gt = GameTime::new(1000.0, 5000.0);
        gt.update(0.0);
        // one hour in a background tab → only 5 ticks
        assert_eq!(gt.update(3_600_000.0), 5);
    }

    #[test]
    fn backwards_timestamp_gives_no_ticks() {
        let mut gt = GameTime::new(1000.0, 5000.0);
        gt.update(10_000.0);
        assert_eq!(gt.update(9_000.0), 0);
        assert_eq!(gt.update(10_000.0), 1);
    }

    #[test]
    fn frame_rate_independent() {
        let mut gt = GameTime::new(1000.0, 5000.0);
        gt.update(0.0);
        let mut total = 0u32;
        // 600 frames at ~16.67ms each = 10 seconds
        for i in 1..=600 {
            total += gt.update(i as f64 * 16.667);
        }
        assert!((9..=11).contains(&total), "expected ~10 ticks, got {}", total);
    }

    #[test]
    fn wall_clock_is_after_2020() {
        assert!(wall_clock_secs() > 1_577_836_800.0);
    }
}
