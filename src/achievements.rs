//! Achievement table and evaluation.
//!
//! Each achievement is a tagged condition checked against an explicit
//! [`EconomyState`]. Unlocks are permanent: an unlocked id is never checked
//! again and only a full reset clears the set.

use crate::economy::EconomyState;

/// Identifiers of all achievements, in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AchievementId {
    FirstClick,
    Cpc5,
    Cpc20,
    Cps100,
    Cps10k,
    Mine10,
    Fusion1,
    Billionaire,
    Shard1,
    Shard5,
    Shard10,
}

impl AchievementId {
    /// Stable key used in snapshots.
    pub fn key(&self) -> &'static str {
        match self {
            AchievementId::FirstClick => "first_click",
            AchievementId::Cpc5 => "cpc5",
            AchievementId::Cpc20 => "cpc20",
            AchievementId::Cps100 => "cps100",
            AchievementId::Cps10k => "cps10k",
            AchievementId::Mine10 => "mine10",
            AchievementId::Fusion1 => "fusion1",
            AchievementId::Billionaire => "billionaire",
            AchievementId::Shard1 => "shard1",
            AchievementId::Shard5 => "shard5",
            AchievementId::Shard10 => "shard10",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        ACHIEVEMENTS.iter().map(|a| a.id).find(|id| id.key() == key)
    }

    pub fn def(&self) -> &'static AchievementDef {
        // every id has exactly one table row
        ACHIEVEMENTS
            .iter()
            .find(|a| a.id == *self)
            .unwrap_or(&ACHIEVEMENTS[0])
    }
}

/// What has to be true for an achievement to unlock.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    TotalEarned(f64),
    Cpc(f64),
    Cps(f64),
    GeneratorCount(&'static str, u64),
    Shards(u64),
}

impl Condition {
    pub fn is_met(&self, state: &EconomyState) -> bool {
        match self {
            Condition::TotalEarned(threshold) => state.total_earned >= *threshold,
            Condition::Cpc(threshold) => state.cpc() >= *threshold,
            Condition::Cps(threshold) => state.cps() >= *threshold,
            Condition::GeneratorCount(name, count) => state.count_by_name(name) >= *count,
            Condition::Shards(count) => state.prestige_shards >= *count,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AchievementDef {
    pub id: AchievementId,
    pub label: &'static str,
    pub description: &'static str,
    pub condition: Condition,
}

pub const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: AchievementId::FirstClick,
        label: "First Tap",
        description: "Tap for the first time.",
        condition: Condition::TotalEarned(1.0),
    },
    AchievementDef {
        id: AchievementId::Cpc5,
        label: "Strong Finger",
        description: "Reach CPC 5.",
        condition: Condition::Cpc(5.0),
    },
    AchievementDef {
        id: AchievementId::Cpc20,
        label: "Steel Index",
        description: "Reach CPC 20.",
        condition: Condition::Cpc(20.0),
    },
    AchievementDef {
        id: AchievementId::Cps100,
        label: "Runs By Itself",
        description: "Reach 100 CPS.",
        condition: Condition::Cps(100.0),
    },
    AchievementDef {
        id: AchievementId::Cps10k,
        label: "Gold Factory",
        description: "Reach 10K CPS.",
        condition: Condition::Cps(10_000.0),
    },
    AchievementDef {
        id: AchievementId::Mine10,
        label: "Seasoned Miner",
        description: "Own 10 Mines.",
        condition: Condition::GeneratorCount("Mine", 10),
    },
    AchievementDef {
        id: AchievementId::Fusion1,
        label: "Fusion Ignition",
        description: "Buy a Fusion Reactor.",
        condition: Condition::GeneratorCount("Fusion Reactor", 1),
    },
    AchievementDef {
        id: AchievementId::Billionaire,
        label: "Billionaire",
        description: "Earn 1B gold in total.",
        condition: Condition::TotalEarned(1_000_000_000.0),
    },
    AchievementDef {
        id: AchievementId::Shard1,
        label: "Rebirth",
        description: "Earn 1 prestige shard.",
        condition: Condition::Shards(1),
    },
    AchievementDef {
        id: AchievementId::Shard5,
        label: "Time Conqueror",
        description: "Earn 5 prestige shards.",
        condition: Condition::Shards(5),
    },
    AchievementDef {
        id: AchievementId::Shard10,
        label: "Lord of Runs",
        description: "Earn 10 prestige shards.",
        condition: Condition::Shards(10),
    },
];

/// Unlock every achievement whose condition now holds.
/// Returns the newly unlocked ids in table order.
pub fn evaluate(state: &mut EconomyState) -> Vec<AchievementId> {
    let newly: Vec<AchievementId> = ACHIEVEMENTS
        .iter()
        .filter(|a| !state.achievements.contains(&a.id))
        .filter(|a| a.condition.is_met(state))
        .map(|a| a.id)
        .collect();
    state.achievements.extend(newly.iter().copied());
    newly
}

/// `(unlocked, total)` for the achievements counter.
pub fn progress(state: &EconomyState) -> (usize, usize) {
    (state.achievements.len(), ACHIEVEMENTS.len())
}
