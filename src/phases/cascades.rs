//! Cascade phases (orders 5.0, 5.5, 6.0)
//!
//! Thin wrappers driving one cascade instance each. The cascade model
//! only sees the ledger through the narrow mortality sink, never the
//! full state tree.

use rand_chacha::ChaCha8Rng;

use crate::core::error::Result;
use crate::core::types::CascadeSystem;
use crate::scheduler::{Phase, PhaseContext, PhaseResult};
use crate::state::SimulationState;

pub struct CascadePhase {
    system: CascadeSystem,
    order: f64,
}

impl CascadePhase {
    pub fn new(system: CascadeSystem, order: f64) -> Self {
        Self { system, order }
    }
}

impl Phase for CascadePhase {
    fn id(&self) -> &'static str {
        match self.system {
            CascadeSystem::PlanetaryBoundaries => "planetary-cascade",
            CascadeSystem::TechnologicalRisk => "tech-cascade",
            CascadeSystem::NuclearTension => "nuclear-tension",
        }
    }

    fn order(&self) -> f64 {
        self.order
    }

    fn execute(
        &mut self,
        state: &mut SimulationState,
        rng: &mut ChaCha8Rng,
        ctx: &PhaseContext,
    ) -> Result<PhaseResult> {
        let s = &mut *state;
        let model = match self.system {
            CascadeSystem::PlanetaryBoundaries => &mut s.planetary,
            CascadeSystem::TechnologicalRisk => &mut s.tech_risk,
            CascadeSystem::NuclearTension => &mut s.nuclear,
        };
        let events = model.update_risk_model(ctx.month, rng, &mut s.ledger);
        Ok(PhaseResult::with_events(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::events::EventType;
    use rand::SeedableRng;

    #[test]
    fn test_active_cascade_reports_deaths_through_ledger() {
        let mut state = SimulationState::default();
        state.ledger.begin_month();
        state.planetary.cascade_active = true;
        state.planetary.severity = 0.8;
        state.planetary.start_month = Some(0);

        let mut phase = CascadePhase::new(CascadeSystem::PlanetaryBoundaries, 5.0);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let result = phase
            .execute(&mut state, &mut rng, &PhaseContext { month: 6 })
            .unwrap();

        assert!(state.ledger.cumulative_crisis_deaths > 0.0);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e, EventType::CrisisDeaths { .. })));
    }
}
