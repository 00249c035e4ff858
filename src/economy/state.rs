//! Economy state definitions.

use std::collections::BTreeSet;

use crate::achievements::AchievementId;

use super::defs::{GeneratorDef, GENERATORS};

/// Gold gained by one tap is `cpc * (1 + TAP_BONUS_PER_SHARD * shards)`.
pub const TAP_BONUS_PER_SHARD: f64 = 0.05;
/// Passive income multiplier is `1 + CPS_BONUS_PER_SHARD * shards`.
pub const CPS_BONUS_PER_SHARD: f64 = 0.25;
/// First tap upgrade price.
pub const TAP_UPGRADE_BASE_COST: f64 = 10.0;
pub const TAP_UPGRADE_GROWTH: f64 = 1.5;
/// Prestige level 1 is reached at 10^(PRESTIGE_EXPONENT_OFFSET + 1) total earned.
pub const PRESTIGE_EXPONENT_OFFSET: i64 = 6;

/// Full state of the economy. CPS and the prestige multiplier are derived
/// on demand from counts and shards and never stored.
#[derive(Clone, Debug, PartialEq)]
pub struct EconomyState {
    /// Spendable gold.
    pub gold: f64,
    /// Lifetime gold earned; survives prestige.
    pub total_earned: f64,
    /// Number of tap upgrades bought this run.
    pub cpc_level: u64,
    /// Owned units, one slot per entry of [`GENERATORS`].
    pub counts: Vec<u64>,
    pub prestige_shards: u64,
    /// Prestige levels already converted into shards.
    pub prestige_spent_levels: u64,
    /// Unlocked achievements; only a full reset clears them.
    pub achievements: BTreeSet<AchievementId>,
    /// Discovery flags, one slot per entry of [`GENERATORS`].
    pub discovered: Vec<bool>,
}

impl Default for EconomyState {
    fn default() -> Self {
        Self::new()
    }
}

impl EconomyState {
    pub fn new() -> Self {
        Self {
            gold: 0.0,
            total_earned: 0.0,
            cpc_level: 0,
            counts: vec![0; GENERATORS.len()],
            prestige_shards: 0,
            prestige_spent_levels: 0,
            achievements: BTreeSet::new(),
            discovered: vec![false; GENERATORS.len()],
        }
    }

    /// Gold per tap before the shard bonus.
    pub fn cpc(&self) -> f64 {
        1.0 + self.cpc_level as f64
    }

    pub fn prestige_multiplier(&self) -> f64 {
        1.0 + CPS_BONUS_PER_SHARD * self.prestige_shards as f64
    }

    /// Gold gained by one tap.
    pub fn tap_gain(&self) -> f64 {
        self.cpc() * (1.0 + TAP_BONUS_PER_SHARD * self.prestige_shards as f64)
    }

    /// Passive income before the prestige multiplier.
    pub fn base_cps(&self) -> f64 {
        GENERATORS
            .iter()
            .zip(&self.counts)
            .map(|(def, &count)| count as f64 * def.unit_cps)
            .sum()
    }

    /// Gold per second from all generators.
    pub fn cps(&self) -> f64 {
        self.prestige_multiplier() * self.base_cps()
    }

    /// Gold per second contributed by one generator line.
    pub fn line_cps(&self, index: usize) -> f64 {
        match GENERATORS.get(index) {
            Some(def) => self.count(index) as f64 * def.unit_cps * self.prestige_multiplier(),
            None => 0.0,
        }
    }

    pub fn count(&self, index: usize) -> u64 {
        self.counts.get(index).copied().unwrap_or(0)
    }

    pub fn count_by_name(&self, name: &str) -> u64 {
        super::defs::generator_index(name).map_or(0, |i| self.count(i))
    }

    pub fn is_discovered(&self, index: usize) -> bool {
        self.discovered.get(index).copied().unwrap_or(false)
    }

    pub fn tap_upgrade_cost(&self) -> f64 {
        (TAP_UPGRADE_BASE_COST * TAP_UPGRADE_GROWTH.powf(self.cpc_level as f64)).round_ties_even()
    }

    /// Price of the next unit of generator `index`, if it exists.
    pub fn generator_cost(&self, index: usize) -> Option<f64> {
        GENERATORS
            .get(index)
            .map(|def: &GeneratorDef| def.cost_at(self.count(index)))
    }

    /// `floor(log10(max(total_earned, 1))) - 6`, floored at 0.
    pub fn current_prestige_level(&self) -> u64 {
        let exponent = decimal_exponent(self.total_earned);
        (exponent - PRESTIGE_EXPONENT_OFFSET).max(0) as u64
    }

    pub fn potential_shard_gain(&self) -> u64 {
        self.current_prestige_level()
            .saturating_sub(self.prestige_spent_levels)
    }

    /// Progress bar fill toward the next shard, in `[0, 1]`. Full once a shard
    /// can be claimed.
    pub fn prestige_progress(&self) -> f64 {
        let earned = finite_or_max(self.total_earned).max(1.0);
        let level = (earned.log10() - PRESTIGE_EXPONENT_OFFSET as f64).max(0.0);
        (level - self.prestige_spent_levels as f64).clamp(0.0, 1.0)
    }

    /// Lifetime earnings needed for the next shard.
    pub fn next_prestige_threshold(&self) -> f64 {
        let exponent = PRESTIGE_EXPONENT_OFFSET as f64 + self.prestige_spent_levels as f64 + 1.0;
        10f64.powf(exponent)
    }
}

fn finite_or_max(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else if x.is_infinite() {
        f64::MAX
    } else {
        x
    }
}

/// Largest power of ten that `powi` produces exactly.
const EXACT_POW10_MAX: i64 = 22;

/// `floor(log10(max(x, 1)))`, corrected for float error next to powers of ten.
fn decimal_exponent(x: f64) -> i64 {
    let x = finite_or_max(x).max(1.0);
    let mut exponent = x.log10().floor() as i64;
    if exponent < EXACT_POW10_MAX && 10f64.powi(exponent as i32 + 1) <= x {
        exponent += 1;
    } else if exponent <= EXACT_POW10_MAX && 10f64.powi(exponent as i32) > x {
        exponent -= 1;
    }
    exponent
}
