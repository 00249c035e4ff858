//! Static generator table for the sample economy.

/// A purchasable passive income source.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorDef {
    /// Unique key, also used in snapshots.
    pub name: &'static str,
    /// Cost of the first unit.
    pub base_cost: f64,
    /// Geometric cost growth per owned unit.
    pub growth: f64,
    /// Gold per second contributed by one unit, before prestige.
    pub unit_cps: f64,
}

impl GeneratorDef {
    const fn new(name: &'static str, base_cost: f64, unit_cps: f64) -> Self {
        Self {
            name,
            base_cost,
            growth: COST_GROWTH,
            unit_cps,
        }
    }

    /// Unrounded price of the next unit when `count` are owned.
    pub fn raw_cost_at(&self, count: u64) -> f64 {
        self.base_cost * self.growth.powf(count as f64)
    }

    /// Integer price of the next unit when `count` are owned. Halves round to even.
    pub fn cost_at(&self, count: u64) -> f64 {
        self.raw_cost_at(count).round_ties_even()
    }
}

pub const COST_GROWTH: f64 = 1.15;

/// All generators in discovery order.
pub const GENERATORS: &[GeneratorDef] = &[
    GeneratorDef::new("Assistant", 15.0, 0.1),
    GeneratorDef::new("Mine", 150.0, 1.0),
    GeneratorDef::new("Factory", 1_200.0, 8.0),
    GeneratorDef::new("City", 15_000.0, 50.0),
    GeneratorDef::new("Rocket", 250_000.0, 350.0),
    GeneratorDef::new("Orbital Station", 2_500_000.0, 2_000.0),
    GeneratorDef::new("Lunar Colonies", 20_000_000.0, 12_000.0),
    GeneratorDef::new("Fusion Reactor", 150_000_000.0, 75_000.0),
    GeneratorDef::new("Generative AI", 1_200_000_000.0, 520_000.0),
    GeneratorDef::new("Space Elevator", 9_500_000_000.0, 3_600_000.0),
    GeneratorDef::new("Terraformer", 75_000_000_000.0, 24_000_000.0),
    GeneratorDef::new("Interstellar Portal", 620_000_000_000.0, 170_000_000.0),
    GeneratorDef::new("Dyson Swarm", 5_000_000_000_000.0, 1_250_000_000.0),
    GeneratorDef::new("Exotic Matter", 40_000_000_000_000.0, 9_500_000_000.0),
    GeneratorDef::new("Quantum Foundry", 320_000_000_000_000.0, 70_000_000_000.0),
    GeneratorDef::new("Dimensional Anchor", 2_600_000_000_000_000.0, 520_000_000_000.0),
    GeneratorDef::new("Star Shipyard", 21_000_000_000_000_000.0, 3_900_000_000_000.0),
    GeneratorDef::new("Alcubierre Drive", 170_000_000_000_000_000.0, 29_000_000_000_000.0),
    GeneratorDef::new("Chronicle Oracle", 1_350_000_000_000_000_000.0, 220_000_000_000_000.0),
    GeneratorDef::new("Cosmic Forge", 10_800_000_000_000_000_000.0, 1_650_000_000_000_000.0),
];

/// Position of `name` in [`GENERATORS`].
pub fn generator_index(name: &str) -> Option<usize> {
    GENERATORS.iter().position(|g| g.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        for (i, a) in GENERATORS.iter().enumerate() {
            for b in &GENERATORS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn base_costs_increase_along_discovery_order() {
        for pair in GENERATORS.windows(2) {
            assert!(pair[0].base_cost < pair[1].base_cost);
        }
    }

    #[test]
    fn first_cost_is_base_cost() {
        assert!((GENERATORS[0].cost_at(0) - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cost_is_rounded() {
        // 15 * 1.15 = 17.25
        assert!((GENERATORS[0].cost_at(1) - 17.0).abs() < f64::EPSILON);
        // 15 * 1.15^2 = 19.8375
        assert!((GENERATORS[0].cost_at(2) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(generator_index("Assistant"), Some(0));
        assert_eq!(generator_index("Fusion Reactor"), Some(7));
        assert_eq!(generator_index("Cursor"), None);
    }
}
