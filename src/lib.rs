//! Idle gold economy engine.
//!
//! Taps and passive generators produce gold, gold buys more generators, and
//! prestige trades a run's progress for a permanent income multiplier.
//! [`engine::Engine`] is the boundary a host drives; the modules below it
//! are plain functions over [`economy::EconomyState`].

pub mod achievements;
pub mod config;
pub mod discovery;
pub mod economy;
pub mod engine;
pub mod error;
pub mod format;
pub mod progression;
pub mod save;
pub mod store;
pub mod time;

pub use config::IdleConfig;
pub use engine::{Engine, LoadOutcome, Notification};
pub use error::{EconomyError, EngineError};
