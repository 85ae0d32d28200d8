//! Deterrence phase (order 6.5)
//!
//! Maintains the circuit breaker chain and, when tension is high
//! enough, runs a stochastic escalation attempt through it. A breach
//! is the catastrophic transition this whole chain exists to gate:
//! nuclear exchange, war mortality through the ledger funnel, and a
//! permanently scarred environment.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::breaker::EscalationContext;
use crate::core::error::Result;
use crate::core::types::{DeathCategory, RootCause};
use crate::ledger::MortalitySink;
use crate::scheduler::events::EventType;
use crate::scheduler::{Phase, PhaseContext, PhaseResult};
use crate::state::SimulationState;

/// Ceiling on the monthly escalation-attempt probability
const MAX_ATTEMPT_PROBABILITY: f64 = 0.25;

pub struct DeterrencePhase;

impl DeterrencePhase {
    fn attempt_probability(state: &SimulationState) -> f64 {
        let nuclear = &state.nuclear;
        let mut p = state.config.escalation_base_probability;
        p += 0.03 * nuclear.risk * nuclear.risk;
        if nuclear.cascade_active {
            p += 0.05 * nuclear.severity;
        }
        p += 0.01 * state.society.war_intensity;
        p.min(MAX_ATTEMPT_PROBABILITY)
    }
}

impl Phase for DeterrencePhase {
    fn id(&self) -> &'static str {
        "deterrence"
    }

    fn order(&self) -> f64 {
        6.5
    }

    fn execute(
        &mut self,
        state: &mut SimulationState,
        rng: &mut ChaCha8Rng,
        _ctx: &PhaseContext,
    ) -> Result<PhaseResult> {
        let s = &mut *state;
        let mut events = Vec::new();

        let attacker = s.deterrence.attacker_capability;
        s.deterrence
            .chain
            .update_monthly(attacker, s.config.safeguard_investment, rng);

        // One exchange is terminal for this subsystem; arsenals do not
        // reload inside a run.
        if s.deterrence.escalation_occurred {
            return Ok(PhaseResult::empty());
        }

        let probability = Self::attempt_probability(s);
        if rng.gen::<f64>() >= probability {
            return Ok(PhaseResult::empty());
        }

        s.deterrence.escalation_attempts += 1;
        let result = s
            .deterrence
            .chain
            .evaluate(&EscalationContext { attacker_capability: attacker }, rng);
        events.push(EventType::EscalationAttempt {
            blocked: result.blocked,
            blocking_layer: result.blocking_layer,
            attacker_capability: attacker,
        });

        if result.blocked {
            s.deterrence.escalations_blocked += 1;
            return Ok(PhaseResult::with_events(events));
        }

        // Every deployed layer failed. The exchange happens.
        let outcome = s.ledger.add_crisis_deaths_attributed(
            s.config.escalation_mortality_rate,
            "nuclear exchange",
            s.config.escalation_exposed_fraction,
            DeathCategory::War,
            &[(RootCause::Conflict, 0.9), (RootCause::Governance, 0.1)],
        );
        if outcome.rejected {
            events.push(EventType::CrisisInputRejected {
                reason: "nuclear exchange".to_string(),
                mortality_rate: s.config.escalation_mortality_rate,
                exposed_fraction: s.config.escalation_exposed_fraction,
            });
        } else {
            events.push(EventType::CrisisDeaths {
                category: DeathCategory::War,
                reason: "nuclear exchange".to_string(),
                requested: outcome.requested,
                applied: outcome.applied,
                capped: outcome.capped,
            });
        }
        events.push(EventType::EscalationSucceeded { deaths: outcome.applied });

        s.deterrence.escalation_occurred = true;
        s.society.war_intensity = 1.0;
        // Soot injection: immediate climate and pollution scarring.
        s.environment.pollution_load = (s.environment.pollution_load + 0.30).min(1.0);
        s.environment.climate_stability = (s.environment.climate_stability - 0.15).max(0.0);

        Ok(PhaseResult::with_events(events))
    }
}
