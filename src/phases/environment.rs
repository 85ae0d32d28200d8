//! Environment phase (order 1.0)
//!
//! Drifts the planetary-boundary pressures, derives the aggregate
//! environment levels the ledger reads (climate stability, food and
//! water security, ecosystem health), and computes the month's
//! environmental mortality rate. An active planetary cascade feeds
//! back into faster boundary degradation.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::cascade::planetary::{
    ATMOSPHERIC_AEROSOLS, BIOGEOCHEMICAL_FLOWS, BIOSPHERE_INTEGRITY, CLIMATE_CHANGE,
    FRESHWATER_USE, LAND_SYSTEM_CHANGE, NOVEL_ENTITIES, OCEAN_ACIDIFICATION,
};
use crate::core::error::Result;
use crate::scheduler::events::EventType;
use crate::scheduler::{Phase, PhaseContext, PhaseResult};
use crate::state::SimulationState;

pub struct EnvironmentPhase;

impl Phase for EnvironmentPhase {
    fn id(&self) -> &'static str {
        "environment"
    }

    fn order(&self) -> f64 {
        1.0
    }

    fn execute(
        &mut self,
        state: &mut SimulationState,
        rng: &mut ChaCha8Rng,
        _ctx: &PhaseContext,
    ) -> Result<PhaseResult> {
        let s = &mut *state;
        let mut events = Vec::new();

        let severity = s.planetary.severity;
        let pollution = s.environment.pollution_load;
        let war = s.society.war_intensity;
        let mitigation = (s.technology.control_research * 0.0006).min(0.0012);

        // Boundary pressure drift. Small monthly increments; the noise
        // half-width is a third of the smallest drift term.
        let drifts: [(&str, f64); 8] = [
            (CLIMATE_CHANGE, 0.0008 + 0.0012 * pollution + 0.0040 * severity - mitigation),
            (BIOSPHERE_INTEGRITY, 0.0010 + 0.0030 * severity - mitigation * 0.5),
            (LAND_SYSTEM_CHANGE, 0.0005 + 0.0015 * severity),
            (FRESHWATER_USE, 0.0004 + 0.0020 * severity),
            (BIOGEOCHEMICAL_FLOWS, 0.0006 - mitigation * 0.5),
            (OCEAN_ACIDIFICATION, 0.0005 + 0.0010 * severity),
            (ATMOSPHERIC_AEROSOLS, 0.0003 + 0.0020 * war),
            (NOVEL_ENTITIES, 0.0007 + 0.0005 * s.technology.deployment.min(2.0)),
        ];
        for (name, drift) in drifts {
            if let Some(signal) = s.planetary.signal_mut(name) {
                let was_breached = signal.breached();
                let noise = (rng.gen::<f64>() * 2.0 - 1.0) * 0.0002;
                signal.update_value(signal.value + drift + noise);
                if signal.breached() && !was_breached {
                    events.push(EventType::SignalBreached {
                        system: s.planetary.system,
                        signal: name.to_string(),
                    });
                }
            }
        }

        // Aggregate levels the ledger reads.
        let climate_pressure =
            s.planetary.signal_mut(CLIMATE_CHANGE).map(|sig| sig.value).unwrap_or(1.0);
        let biosphere_pressure =
            s.planetary.signal_mut(BIOSPHERE_INTEGRITY).map(|sig| sig.value).unwrap_or(1.0);
        let freshwater_pressure =
            s.planetary.signal_mut(FRESHWATER_USE).map(|sig| sig.value).unwrap_or(1.0);

        let env = &mut s.environment;
        env.climate_stability = (1.55 - 0.50 * climate_pressure).clamp(0.0, 1.0);
        env.ecosystem_health = (1.45 - 0.45 * biosphere_pressure).clamp(0.0, 1.0);
        env.water_security = (1.45 - 0.50 * freshwater_pressure).clamp(0.0, 1.0);

        // Food security follows its binding constraints with inertia.
        let food_target = (0.25
            + 0.45 * env.climate_stability
            + 0.30 * env.water_security.min(env.ecosystem_health)
            - 0.25 * war)
            .clamp(0.0, 1.0);
        env.food_security += (food_target - env.food_security) * 0.08;

        // Pollution accumulates with deployment, decays with cleanup.
        let cleanup = 0.0015 * s.technology.control_research;
        env.pollution_load = (env.pollution_load
            + 0.0010 * s.technology.deployment.min(2.0)
            + 0.08 * war
            - cleanup)
            .clamp(0.0, 1.0);

        // Environmental mortality: zero in a healthy month, grows as
        // the aggregates fall below their comfort thresholds. Cascade
        // deaths are booked separately by the cascade model.
        env.environmental_mortality_rate = (0.0030 * (0.85 - env.climate_stability).max(0.0)
            + 0.0045 * (0.80 - env.food_security).max(0.0)
            + 0.0035 * (0.80 - env.water_security).max(0.0)
            + 0.0015 * (env.pollution_load - 0.55).max(0.0))
        .clamp(0.0, 0.05);

        Ok(PhaseResult::with_events(events))
    }
}
