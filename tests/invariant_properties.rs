//! Property tests for the hard invariants
//!
//! Whatever sequence of crisis reports arrives, the stock stays
//! non-negative and the monthly cap holds; however a layer is tuned,
//! bypass probability stays monotone in effectiveness.

use proptest::prelude::*;

use worldline::breaker::{LayerKind, SafeguardLayer, MAX_BYPASS_PROBABILITY};
use worldline::core::types::DeathCategory;
use worldline::ledger::{MortalitySink, PopulationLedger, MONTHLY_DEATH_CAP_FRACTION};

proptest! {
    #[test]
    fn population_never_negative_and_cap_holds(
        start in 0.01f64..20.0,
        rates in prop::collection::vec(0.0f64..=1.0, 1..24),
    ) {
        let mut ledger = PopulationLedger::new(start);
        ledger.begin_month();
        let cap = MONTHLY_DEATH_CAP_FRACTION * start;

        let mut any_scaled = false;
        for (i, rate) in rates.iter().enumerate() {
            let category = DeathCategory::ALL[i % DeathCategory::ALL.len()];
            let outcome = ledger.add_crisis_deaths(*rate, "prop", 1.0, category);
            any_scaled |= outcome.capped;
            prop_assert!(ledger.population >= 0.0);
        }

        prop_assert!(ledger.monthly_deaths_applied <= cap + 1e-9);
        prop_assert_eq!(ledger.monthly_death_cap_reached, any_scaled);

        let by_category: f64 = ledger.deaths_by_category.values().sum();
        prop_assert!((by_category - ledger.cumulative_crisis_deaths).abs() < 1e-9);
    }

    #[test]
    fn invalid_inputs_never_mutate(
        rate in prop_oneof![Just(f64::NAN), Just(f64::INFINITY), 1.0001f64..100.0, -100.0f64..-0.0001],
    ) {
        let mut ledger = PopulationLedger::new(8.0);
        ledger.begin_month();
        let outcome = ledger.add_crisis_deaths(rate, "bad", 1.0, DeathCategory::Other);
        prop_assert!(outcome.rejected);
        prop_assert_eq!(ledger.population, 8.0);
        prop_assert_eq!(ledger.cumulative_crisis_deaths, 0.0);
    }

    #[test]
    fn bypass_probability_monotone_in_effectiveness(
        effectiveness in 0.05f64..0.99,
        boost in 0.0f64..0.5,
        attacker in 0.0f64..3.0,
        strength in 0.5f64..2.0,
    ) {
        let weak = SafeguardLayer::new(LayerKind::KillSwitch, effectiveness, strength);
        let strong = SafeguardLayer::new(
            LayerKind::KillSwitch,
            (effectiveness + boost).min(0.99),
            strength,
        );
        let weak_bypass = weak.bypass_probability(attacker);
        let strong_bypass = strong.bypass_probability(attacker);
        prop_assert!(strong_bypass <= weak_bypass + 1e-12);
        prop_assert!((0.0..=MAX_BYPASS_PROBABILITY).contains(&weak_bypass));
    }
}
