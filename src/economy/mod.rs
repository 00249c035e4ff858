//! Economy model: gold, generators, tap upgrades and prestige.

pub mod defs;
pub mod logic;
pub mod state;

pub use defs::{generator_index, GeneratorDef, GENERATORS};
pub use logic::BulkPurchase;
pub use state::EconomyState;
