//! Technology phase (order 3.0)
//!
//! Compounds frontier capability, advances control research, and
//! pushes the updated gap values into the technological-risk signals.
//! Also derives the attacker capability the deterrence phase contests
//! against: a more capable frontier makes safeguard bypass easier.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::cascade::technological::{
    ALIGNMENT_DRIFT, CAPABILITY_CONTROL_GAP, COMPUTE_CONCENTRATION, DEPLOYMENT_BREADTH,
    INTERPRETABILITY_SHORTFALL,
};
use crate::core::error::Result;
use crate::scheduler::events::EventType;
use crate::scheduler::{Phase, PhaseContext, PhaseResult};
use crate::state::SimulationState;

pub struct TechnologyPhase;

impl Phase for TechnologyPhase {
    fn id(&self) -> &'static str {
        "technology"
    }

    fn order(&self) -> f64 {
        3.0
    }

    fn execute(
        &mut self,
        state: &mut SimulationState,
        rng: &mut ChaCha8Rng,
        _ctx: &PhaseContext,
    ) -> Result<PhaseResult> {
        let s = &mut *state;
        let mut events = Vec::new();

        let tech = &mut s.technology;
        let noise = 1.0 + (rng.gen::<f64>() * 2.0 - 1.0) * 0.2;
        tech.capability *= 1.0 + s.config.capability_growth_rate * noise;
        tech.control_research += s.config.safeguard_investment * 0.008;
        tech.deployment += 0.0015 * tech.capability.min(3.0);

        // Push the gap values into the risk signals. Control research
        // narrows the gaps; raw capability growth widens them.
        let restraint = (tech.control_research / (tech.capability + 0.5)).min(2.0);
        let capability = tech.capability;
        let deployment = tech.deployment;

        let drifts: [(&str, f64); 5] = [
            (CAPABILITY_CONTROL_GAP, 0.0030 * capability.min(3.0) - 0.0028 * restraint),
            (ALIGNMENT_DRIFT, 0.0022 * capability.min(3.0) - 0.0021 * restraint),
            (INTERPRETABILITY_SHORTFALL, 0.0018 * capability.min(3.0) - 0.0015 * restraint),
            (COMPUTE_CONCENTRATION, 0.0006),
            (DEPLOYMENT_BREADTH, 0.0),
        ];
        for (name, drift) in drifts {
            if let Some(signal) = s.tech_risk.signal_mut(name) {
                let was_breached = signal.breached();
                let value = if name == DEPLOYMENT_BREADTH {
                    deployment
                } else {
                    signal.value + drift
                };
                signal.update_value(value);
                if signal.breached() && !was_breached {
                    events.push(EventType::SignalBreached {
                        system: s.tech_risk.system,
                        signal: name.to_string(),
                    });
                }
            }
        }

        // Attacker capability: the configured base plus frontier tooling
        // plus whatever an active technological cascade has let loose.
        s.deterrence.attacker_capability = (s.deterrence.base_attacker_capability
            + 0.20 * (capability - 1.0).max(0.0)
            + 0.40 * s.tech_risk.severity)
            .clamp(0.1, 3.0);

        Ok(PhaseResult::with_events(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_capability_compounds() {
        let mut state = SimulationState::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for month in 0..120 {
            TechnologyPhase.execute(&mut state, &mut rng, &PhaseContext { month }).unwrap();
        }
        // 0.4%/month for 10 years is roughly +60%.
        assert!(state.technology.capability > 1.3);
        assert!(state.deterrence.attacker_capability > 0.3);
    }

    #[test]
    fn test_gap_signals_widen_without_investment() {
        let mut state = SimulationState::default();
        state.config.safeguard_investment = 0.0;
        let start = state
            .tech_risk
            .signal_mut(CAPABILITY_CONTROL_GAP)
            .map(|sig| sig.value)
            .unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for month in 0..240 {
            TechnologyPhase.execute(&mut state, &mut rng, &PhaseContext { month }).unwrap();
        }
        let end = state
            .tech_risk
            .signal_mut(CAPABILITY_CONTROL_GAP)
            .map(|sig| sig.value)
            .unwrap();
        assert!(end > start, "gap should widen: {start} -> {end}");
    }
}
