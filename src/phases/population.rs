//! Population phase (order 8.0)
//!
//! Runs last: by now every crisis subsystem has reported its deaths,
//! so the demographic update sees the month's final conditions. Turns
//! the ledger's month report into structured events.

use rand_chacha::ChaCha8Rng;

use crate::core::error::Result;
use crate::ledger::BOTTLENECK_THRESHOLD;
use crate::scheduler::events::EventType;
use crate::scheduler::{Phase, PhaseContext, PhaseResult};
use crate::state::SimulationState;

pub struct PopulationPhase {
    bottleneck_reported: bool,
}

impl PopulationPhase {
    pub fn new() -> Self {
        Self { bottleneck_reported: false }
    }
}

impl Default for PopulationPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for PopulationPhase {
    fn id(&self) -> &'static str {
        "population"
    }

    fn order(&self) -> f64 {
        8.0
    }

    fn execute(
        &mut self,
        state: &mut SimulationState,
        rng: &mut ChaCha8Rng,
        ctx: &PhaseContext,
    ) -> Result<PhaseResult> {
        let s = &mut *state;
        let update = s.ledger.update_month(
            &s.environment,
            &s.society,
            &s.technology,
            &s.config,
            ctx.month,
            rng,
        );

        let mut events = Vec::new();
        for component in update.guards {
            events.push(EventType::ArithmeticGuard { component: component.to_string() });
        }
        if let Some(overshoot) = update.overshoot {
            events.push(EventType::OvershootDieOff {
                requested: overshoot.requested,
                applied: overshoot.applied,
            });
        }
        if s.ledger.monthly_death_cap_reached {
            events.push(EventType::DeathCapReached {
                month_start_population: s.ledger.month_start_population,
            });
        }
        if !self.bottleneck_reported && s.ledger.population < BOTTLENECK_THRESHOLD {
            self.bottleneck_reported = true;
            events.push(EventType::PopulationBottleneck { population: s.ledger.population });
        }

        Ok(PhaseResult::with_events(events))
    }
}
