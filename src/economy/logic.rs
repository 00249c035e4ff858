//! Economy operations: pure read-modify-write over [`EconomyState`].
//!
//! Every failing operation returns before touching the state. Achievement
//! evaluation is the caller's job (see `engine`).

use crate::discovery;
use crate::error::EconomyError;

use super::defs::{GeneratorDef, GENERATORS};
use super::state::EconomyState;

/// Result of a bulk generator purchase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulkPurchase {
    pub quantity: u64,
    pub spent: f64,
}

/// Manual tap. Returns the gold gained.
pub fn tap(state: &mut EconomyState) -> f64 {
    let gain = state.tap_gain();
    state.gold += gain;
    state.total_earned += gain;
    gain
}

/// Buy one tap upgrade. Returns the price paid.
pub fn buy_tap_upgrade(state: &mut EconomyState) -> Result<f64, EconomyError> {
    let cost = state.tap_upgrade_cost();
    if state.gold < cost {
        return Err(EconomyError::InsufficientFunds {
            cost,
            gold: state.gold,
        });
    }
    state.gold -= cost;
    state.cpc_level = state.cpc_level.saturating_add(1);
    Ok(cost)
}

fn def_at(index: usize) -> Result<&'static GeneratorDef, EconomyError> {
    GENERATORS
        .get(index)
        .ok_or_else(|| EconomyError::UnknownGenerator(format!("#{index}")))
}

/// Buy a single unit of generator `index`. Returns the price paid.
pub fn buy_generator_one(state: &mut EconomyState, index: usize) -> Result<f64, EconomyError> {
    let def = def_at(index)?;
    let cost = def.cost_at(state.count(index));
    if state.gold < cost {
        return Err(EconomyError::InsufficientFunds {
            cost,
            gold: state.gold,
        });
    }
    state.gold -= cost;
    state.counts[index] = state.counts[index].saturating_add(1);
    discovery::discover(state, index);
    Ok(cost)
}

/// Replay single-unit purchases against `gold` starting at `count` owned.
/// This is the only place that decides how many units a budget buys.
fn replay_purchases(def: &GeneratorDef, count: u64, mut gold: f64) -> u64 {
    let mut bought = 0u64;
    loop {
        let cost = def.cost_at(count.saturating_add(bought));
        // `!(a >= b)` also stops on NaN gold.
        if !cost.is_finite() || !(gold >= cost) {
            break;
        }
        gold -= cost;
        bought += 1;
    }
    bought
}

/// Buy as many units of generator `index` as the current gold allows.
/// Buying nothing is not an error.
pub fn buy_generator_max(
    state: &mut EconomyState,
    index: usize,
) -> Result<BulkPurchase, EconomyError> {
    let def = def_at(index)?;
    let count = state.count(index);
    let quantity = replay_purchases(def, count, state.gold);
    let mut spent = 0.0;
    for i in 0..quantity {
        let cost = def.cost_at(count.saturating_add(i));
        state.gold -= cost;
        spent += cost;
    }
    if quantity > 0 {
        state.counts[index] = count.saturating_add(quantity);
        discovery::discover(state, index);
    }
    Ok(BulkPurchase { quantity, spent })
}

/// How many units `buy_generator_max` would buy right now.
pub fn max_affordable(state: &EconomyState, index: usize) -> u64 {
    match GENERATORS.get(index) {
        Some(def) => replay_purchases(def, state.count(index), state.gold),
        None => 0,
    }
}

/// Closed-form estimate of affordable units for a geometric price series
/// with first (unrounded) price `first_cost` and ratio `ratio`.
///
/// Ignores per-unit rounding, so it can be off by one from
/// [`max_affordable`]. Never decides a purchase.
pub fn geometric_max_affordable(gold: f64, first_cost: f64, ratio: f64) -> u64 {
    if !(first_cost > 0.0) || !(gold >= first_cost) {
        return 0;
    }
    let estimate = if (ratio - 1.0).abs() < 1e-9 {
        (gold / first_cost).floor()
    } else {
        (1.0 + (ratio - 1.0) * (gold / first_cost)).log(ratio).floor()
    };
    if estimate.is_finite() && estimate > 0.0 {
        estimate as u64
    } else {
        0
    }
}

/// Convert unspent prestige levels into shards and reset the run.
/// Returns the number of shards gained.
pub fn prestige(state: &mut EconomyState) -> Result<u64, EconomyError> {
    let gain = state.potential_shard_gain();
    if gain == 0 {
        return Err(EconomyError::NothingToPrestige);
    }
    // decoded shard counts may already sit at u64::MAX
    state.prestige_shards = state.prestige_shards.saturating_add(gain);
    state.prestige_spent_levels = state.prestige_spent_levels.saturating_add(gain);

    state.gold = 0.0;
    state.cpc_level = 0;
    state.counts.iter_mut().for_each(|c| *c = 0);
    state.discovered.iter_mut().for_each(|d| *d = false);
    Ok(gain)
}

/// Credit `cps * seconds` of passive income. Returns the gold gained.
pub fn apply_elapsed(state: &mut EconomyState, seconds: f64, cps: f64) -> f64 {
    let gain = cps * seconds;
    if !gain.is_finite() || gain <= 0.0 {
        return 0.0;
    }
    state.gold += gain;
    state.total_earned += gain;
    gain
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_generator() -> impl Strategy<Value = usize> {
        0..GENERATORS.len()
    }

    proptest! {
        #[test]
        // Lower tiers keep every partial sum below 2^53.
        fn prop_bulk_purchase_spends_exact_rounded_sum(
            index in 0usize..12,
            n in 0u64..40,
            extra in 0.0f64..1.0,
        ) {
            let def = &GENERATORS[index];
            let sum: f64 = (0..n).map(|i| def.cost_at(i)).sum();
            // Short of the next unit, so exactly n are affordable.
            let budget = sum + extra * (def.cost_at(n) - 1.0);

            let mut state = EconomyState::new();
            state.gold = budget;
            let bulk = buy_generator_max(&mut state, index).unwrap();
            prop_assert_eq!(bulk.quantity, n);
            prop_assert_eq!(state.counts[index], n);

            let mut sequential = budget;
            for i in 0..n {
                sequential -= def.cost_at(i);
            }
            prop_assert_eq!(state.gold.to_bits(), sequential.to_bits());
        }

        #[test]
        fn prop_bulk_equals_repeated_single(
            index in arb_generator(),
            start in 0u64..40,
            gold_scale in 0.0f64..80.0,
        ) {
            let def = &GENERATORS[index];
            let gold = def.cost_at(start) * gold_scale;

            let mut bulk_state = EconomyState::new();
            bulk_state.counts[index] = start;
            bulk_state.gold = gold;
            let shown = max_affordable(&bulk_state, index);
            let bulk = buy_generator_max(&mut bulk_state, index).unwrap();

            let mut single_state = EconomyState::new();
            single_state.counts[index] = start;
            single_state.gold = gold;
            let mut singles = 0u64;
            while buy_generator_one(&mut single_state, index).is_ok() {
                singles += 1;
            }

            prop_assert_eq!(shown, bulk.quantity);
            prop_assert_eq!(bulk.quantity, singles);
            prop_assert_eq!(bulk_state.gold.to_bits(), single_state.gold.to_bits());
            prop_assert_eq!(&bulk_state, &single_state);
        }

        #[test]
        fn prop_geometric_estimate_within_one_of_replay(
            index in arb_generator(),
            start in 0u64..40,
            gold_scale in 1.0f64..500.0,
        ) {
            let def = &GENERATORS[index];
            let mut state = EconomyState::new();
            state.counts[index] = start;
            state.gold = def.cost_at(start) * gold_scale;
            let exact = max_affordable(&state, index);
            let estimate = geometric_max_affordable(state.gold, def.raw_cost_at(start), def.growth);
            prop_assert!(exact.abs_diff(estimate) <= 1,
                "exact={} estimate={}", exact, estimate);
        }

        #[test]
        fn prop_prestige_level_steps_at_powers_of_ten(k in 7i32..=22) {
            let at: f64 = format!("1e{k}").parse().unwrap();
            let mut state = EconomyState::new();
            state.total_earned = at;
            prop_assert_eq!(state.current_prestige_level(), (k - 6) as u64);
            state.total_earned = at * (1.0 - 1e-12);
            prop_assert_eq!(state.current_prestige_level(), (k - 7) as u64);
        }

        #[test]
        fn prop_prestige_level_zero_below_ten_million(total in 0.0f64..1e7) {
            let mut state = EconomyState::new();
            state.total_earned = total;
            prop_assert_eq!(state.current_prestige_level(), 0);
        }

        #[test]
        fn prop_failed_purchase_leaves_state_untouched(
            index in arb_generator(),
            frac in 0.0f64..0.999,
        ) {
            let mut state = EconomyState::new();
            state.gold = GENERATORS[index].cost_at(0) * frac;
            let before = state.clone();
            prop_assert!(buy_generator_one(&mut state, index).is_err());
            prop_assert_eq!(state, before);
        }
    }
}
