//! Engine facade: the one object a host talks to.
//!
//! Owns the economy state, the storage backend and the save gate. Commands
//! mutate, queries read, and everything the player should hear about is
//! queued as a [`Notification`] until the host drains it.

use crate::achievements::{self, AchievementDef, AchievementId};
use crate::config::IdleConfig;
use crate::discovery;
use crate::economy::{generator_index, logic, BulkPurchase, EconomyState, GENERATORS};
use crate::error::{EconomyError, EngineError, StoreError};
use crate::progression::{self, OfflineGain};
use crate::save;
use crate::store::SnapshotStore;
use crate::time::{wall_clock_secs, GameTime};

#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    AchievementUnlocked(AchievementId),
    PrestigeCompleted {
        gain: u64,
        new_multiplier: f64,
    },
    OfflineGainApplied(OfflineGain),
    /// Any rejected economy command, prestige included.
    PurchaseRejected(EconomyError),
    SaveFailed(String),
    Saved,
    /// The stored snapshot was unreadable and the game started over.
    SnapshotRecovered {
        reason: String,
        backup: Option<String>,
    },
}

/// One generator line as the presentation layer sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorView {
    pub index: usize,
    pub name: &'static str,
    pub count: u64,
    pub next_cost: f64,
    pub max_affordable: u64,
    pub visible: bool,
    pub discovered: bool,
    pub unit_cps: f64,
    pub line_cps: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    pub ticks: u32,
    pub gained: f64,
    /// Enough ticks have passed since the last successful save.
    pub autosave_due: bool,
}

/// An encoded snapshot waiting to be written. Hand the result of the
/// write back to [`Engine::finish_save`].
#[derive(Debug)]
pub struct PendingSave {
    payload: String,
}

impl PendingSave {
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    /// Nothing stored; defaults.
    Fresh,
    Restored {
        schema_version: u32,
        offline: OfflineGain,
    },
    /// Stored snapshot was unusable; defaults, old data moved to `backup`.
    Recovered { backup: Option<String> },
}

pub struct Engine<S: SnapshotStore> {
    state: EconomyState,
    config: IdleConfig,
    store: S,
    clock: GameTime,
    notifications: Vec<Notification>,
    save_in_flight: bool,
    ticks_since_save: u32,
}

impl<S: SnapshotStore> Engine<S> {
    /// A fresh engine with default state. Call [`Engine::load`] to restore.
    pub fn new(config: IdleConfig, store: S) -> Self {
        let clock = GameTime::new(config.ms_per_tick(), config.max_frame_gap_ms);
        Self {
            state: EconomyState::new(),
            config,
            store,
            clock,
            notifications: Vec::new(),
            save_in_flight: false,
            ticks_since_save: 0,
        }
    }

    // ── Queries ─────────────────────────────────────────────

    pub fn state(&self) -> &EconomyState {
        &self.state
    }

    pub fn config(&self) -> &IdleConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn gold(&self) -> f64 {
        self.state.gold
    }

    pub fn total_earned(&self) -> f64 {
        self.state.total_earned
    }

    pub fn cps(&self) -> f64 {
        self.state.cps()
    }

    pub fn cpc(&self) -> f64 {
        self.state.cpc()
    }

    pub fn tap_gain(&self) -> f64 {
        self.state.tap_gain()
    }

    pub fn tap_upgrade_cost(&self) -> f64 {
        self.state.tap_upgrade_cost()
    }

    pub fn prestige_multiplier(&self) -> f64 {
        self.state.prestige_multiplier()
    }

    pub fn prestige_shards(&self) -> u64 {
        self.state.prestige_shards
    }

    pub fn potential_shard_gain(&self) -> u64 {
        self.state.potential_shard_gain()
    }

    pub fn prestige_progress(&self) -> f64 {
        self.state.prestige_progress()
    }

    pub fn next_prestige_threshold(&self) -> f64 {
        self.state.next_prestige_threshold()
    }

    pub fn generator(&self, index: usize) -> Option<GeneratorView> {
        let def = GENERATORS.get(index)?;
        let count = self.state.count(index);
        Some(GeneratorView {
            index,
            name: def.name,
            count,
            next_cost: def.cost_at(count),
            max_affordable: logic::max_affordable(&self.state, index),
            visible: discovery::is_visible(&self.state, index),
            discovered: self.state.is_discovered(index),
            unit_cps: def.unit_cps,
            line_cps: self.state.line_cps(index),
        })
    }

    pub fn generator_by_name(&self, name: &str) -> Option<GeneratorView> {
        generator_index(name).and_then(|i| self.generator(i))
    }

    /// Every generator line, visible or not, in table order.
    pub fn generators(&self) -> Vec<GeneratorView> {
        (0..GENERATORS.len())
            .filter_map(|i| self.generator(i))
            .collect()
    }

    pub fn visible_generators(&self) -> Vec<GeneratorView> {
        discovery::visible_generators(&self.state)
            .into_iter()
            .filter_map(|i| self.generator(i))
            .collect()
    }

    /// Unlocked achievements in table order.
    pub fn unlocked_achievements(&self) -> Vec<&'static AchievementDef> {
        achievements::ACHIEVEMENTS
            .iter()
            .filter(|a| self.state.achievements.contains(&a.id))
            .collect()
    }

    pub fn achievement_progress(&self) -> (usize, usize) {
        achievements::progress(&self.state)
    }

    pub fn save_in_flight(&self) -> bool {
        self.save_in_flight
    }

    pub fn pending_notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // ── Commands ────────────────────────────────────────────

    pub fn tap(&mut self) -> f64 {
        let gain = logic::tap(&mut self.state);
        self.check_achievements();
        gain
    }

    pub fn buy_tap_upgrade(&mut self) -> Result<f64, EconomyError> {
        let result = logic::buy_tap_upgrade(&mut self.state);
        self.settle(result)
    }

    pub fn buy_generator_one(&mut self, name: &str) -> Result<f64, EconomyError> {
        let result =
            self.resolve(name).and_then(|i| logic::buy_generator_one(&mut self.state, i));
        self.settle(result)
    }

    /// Buy as many units as gold allows. Buying nothing is `Ok` with
    /// quantity 0, but the player is still told it was unaffordable.
    pub fn buy_generator_max(&mut self, name: &str) -> Result<BulkPurchase, EconomyError> {
        let result = self
            .resolve(name)
            .and_then(|i| logic::buy_generator_max(&mut self.state, i).map(|p| (i, p)));
        let (index, purchase) = self.settle(result)?;
        if purchase.quantity == 0 {
            let cost = self.state.generator_cost(index).unwrap_or(f64::INFINITY);
            self.notifications
                .push(Notification::PurchaseRejected(EconomyError::InsufficientFunds {
                    cost,
                    gold: self.state.gold,
                }));
        }
        Ok(purchase)
    }

    pub fn prestige(&mut self) -> Result<u64, EconomyError> {
        let result = logic::prestige(&mut self.state);
        let gain = self.settle(result)?;
        let new_multiplier = self.state.prestige_multiplier();
        tracing::info!(
            target: "idle_gold::engine",
            gain,
            shards = self.state.prestige_shards,
            multiplier = new_multiplier,
            "prestige.completed"
        );
        self.notifications.push(Notification::PrestigeCompleted {
            gain,
            new_multiplier,
        });
        Ok(gain)
    }

    /// Run one periodic tick of `tick_seconds`.
    pub fn tick(&mut self) -> TickReport {
        let gained = progression::tick(&mut self.state, self.config.tick_seconds);
        self.check_achievements();
        self.ticks_since_save = self.ticks_since_save.saturating_add(1);
        TickReport {
            ticks: 1,
            gained,
            autosave_due: self.autosave_due(),
        }
    }

    /// Feed a frame timestamp in milliseconds and run however many ticks
    /// have accumulated.
    pub fn pump(&mut self, now_ms: f64) -> TickReport {
        let ticks = self.clock.update(now_ms);
        let mut report = TickReport::default();
        for _ in 0..ticks {
            let step = self.tick();
            report.ticks += 1;
            report.gained += step.gained;
            report.autosave_due |= step.autosave_due;
        }
        report
    }

    fn autosave_due(&self) -> bool {
        let interval = self.config.autosave_interval_ticks;
        interval > 0 && self.ticks_since_save >= interval && !self.save_in_flight
    }

    /// Encode and write a snapshot stamped with the current wall clock.
    pub fn save(&mut self) -> Result<(), EngineError> {
        self.save_at(wall_clock_secs())
    }

    pub fn save_at(&mut self, now: f64) -> Result<(), EngineError> {
        let pending = self.begin_save(now)?;
        let written = self.store.write_atomic(pending.payload());
        self.finish_save(written)
    }

    /// Encode a snapshot and raise the save-in-flight flag. Fails with
    /// [`EngineError::SaveInProgress`] while another save is outstanding.
    pub fn begin_save(&mut self, now: f64) -> Result<PendingSave, EngineError> {
        if self.save_in_flight {
            return Err(EngineError::SaveInProgress);
        }
        let payload = save::encode(&self.state, now)?;
        self.save_in_flight = true;
        Ok(PendingSave { payload })
    }

    /// Lower the save-in-flight flag and report the outcome of the write.
    pub fn finish_save(&mut self, written: Result<(), StoreError>) -> Result<(), EngineError> {
        self.save_in_flight = false;
        match written {
            Ok(()) => {
                self.ticks_since_save = 0;
                tracing::debug!(target: "idle_gold::engine", "save.written");
                self.notifications.push(Notification::Saved);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(target: "idle_gold::engine", error = %err, "save.failed");
                self.notifications
                    .push(Notification::SaveFailed(err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Restore from the store and apply offline income. Never fails: an
    /// unreadable snapshot is moved aside and the game starts from defaults.
    pub fn load(&mut self) -> LoadOutcome {
        self.load_at(wall_clock_secs())
    }

    pub fn load_at(&mut self, now: f64) -> LoadOutcome {
        self.ticks_since_save = 0;
        let text = match self.store.read() {
            Ok(Some(text)) => text,
            Ok(None) => {
                self.state = EconomyState::new();
                tracing::info!(target: "idle_gold::engine", "load.fresh");
                return LoadOutcome::Fresh;
            }
            Err(StoreError::Corrupt(reason)) => {
                let backup = self.quarantine();
                return self.recover(reason, backup);
            }
            Err(err) => return self.recover(err.to_string(), None),
        };

        match save::decode(&text) {
            Ok(snapshot) => {
                self.state = snapshot.state;
                let offline = progression::offline_catch_up(
                    &mut self.state,
                    snapshot.last_saved,
                    now,
                    self.config.offline_cap_hours,
                );
                tracing::info!(
                    target: "idle_gold::engine",
                    schema_version = snapshot.schema_version,
                    offline_gold = offline.amount,
                    hours_elapsed = offline.hours_elapsed,
                    hours_applied = offline.hours_applied,
                    "load.restored"
                );
                if offline.amount > 0.0 {
                    self.notifications
                        .push(Notification::OfflineGainApplied(offline));
                }
                self.check_achievements();
                LoadOutcome::Restored {
                    schema_version: snapshot.schema_version,
                    offline,
                }
            }
            Err(err) => {
                let backup = self.quarantine();
                self.recover(err.to_string(), backup)
            }
        }
    }

    /// Move an undecodable snapshot aside so the next save cannot clobber it.
    fn quarantine(&mut self) -> Option<String> {
        match self.store.quarantine() {
            Ok(backup) => backup,
            Err(err) => {
                tracing::warn!(
                    target: "idle_gold::engine",
                    error = %err,
                    "load.quarantine_failed"
                );
                None
            }
        }
    }

    fn recover(&mut self, reason: String, backup: Option<String>) -> LoadOutcome {
        tracing::warn!(
            target: "idle_gold::engine",
            reason = %reason,
            backup = backup.as_deref().unwrap_or("-"),
            "load.recovered"
        );
        self.state = EconomyState::new();
        self.notifications.push(Notification::SnapshotRecovered {
            reason,
            backup: backup.clone(),
        });
        LoadOutcome::Recovered { backup }
    }

    /// Wipe everything, achievements and shards included, and delete the
    /// stored snapshot. In-memory state is reset even if the delete fails.
    /// Refused while a save is in flight, since that write would bring the
    /// old snapshot back.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        if self.save_in_flight {
            return Err(EngineError::SaveInProgress);
        }
        self.state = EconomyState::new();
        self.ticks_since_save = 0;
        tracing::info!(target: "idle_gold::engine", "reset");
        self.store.clear()?;
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────

    fn resolve(&self, name: &str) -> Result<usize, EconomyError> {
        generator_index(name).ok_or_else(|| EconomyError::UnknownGenerator(name.to_string()))
    }

    /// Evaluate achievements after a successful command, or queue the
    /// rejection.
    fn settle<T>(&mut self, result: Result<T, EconomyError>) -> Result<T, EconomyError> {
        match &result {
            Ok(_) => self.check_achievements(),
            Err(err) => {
                tracing::debug!(target: "idle_gold::engine", error = %err, "command.rejected");
                self.notifications
                    .push(Notification::PurchaseRejected(err.clone()));
            }
        }
        result
    }

    fn check_achievements(&mut self) {
        for id in achievements::evaluate(&mut self.state) {
            tracing::info!(target: "idle_gold::engine", achievement = id.key(), "achievement.unlocked");
            self.notifications.push(Notification::AchievementUnlocked(id));
        }
    }
}
