//! Generator reveal policy.
//!
//! A generator is visible once discovered, and exactly one further
//! generator (the first undiscovered one in table order) is previewed.

use crate::economy::{EconomyState, GENERATORS};

/// Mark generator `index` as discovered. Discovery never reverts on its own.
pub fn discover(state: &mut EconomyState, index: usize) {
    if let Some(flag) = state.discovered.get_mut(index) {
        *flag = true;
    }
}

/// Discover every generator with at least one unit owned.
pub fn discover_owned(state: &mut EconomyState) {
    for (flag, &count) in state.discovered.iter_mut().zip(&state.counts) {
        if count > 0 {
            *flag = true;
        }
    }
}

/// The single locked generator currently previewed, if any remain.
pub fn next_undiscovered(state: &EconomyState) -> Option<usize> {
    (0..GENERATORS.len()).find(|&i| !state.is_discovered(i))
}

pub fn is_visible(state: &EconomyState, index: usize) -> bool {
    index < GENERATORS.len()
        && (state.is_discovered(index) || next_undiscovered(state) == Some(index))
}

/// Indices of visible generators, in table order.
pub fn visible_generators(state: &EconomyState) -> Vec<usize> {
    (0..GENERATORS.len())
        .filter(|&i| is_visible(state, i))
        .collect()
}
