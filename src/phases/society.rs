//! Society phase (order 2.0)
//!
//! Drifts the social conditions the birth/death composition reads.
//! Societies respond to what last month did to them: crisis deaths
//! erode stability and healthcare, scarcity erodes economic security,
//! peace lets war intensity fade.

use rand_chacha::ChaCha8Rng;

use crate::core::error::Result;
use crate::scheduler::{Phase, PhaseContext, PhaseResult};
use crate::state::SimulationState;

pub struct SocietyPhase;

impl Phase for SocietyPhase {
    fn id(&self) -> &'static str {
        "society"
    }

    fn order(&self) -> f64 {
        2.0
    }

    fn execute(
        &mut self,
        state: &mut SimulationState,
        _rng: &mut ChaCha8Rng,
        _ctx: &PhaseContext,
    ) -> Result<PhaseResult> {
        let s = &mut *state;

        // Fraction of the population lost to crises last month.
        let loss_fraction = if s.ledger.month_start_population > 0.0 {
            (s.ledger.monthly_deaths_applied / s.ledger.month_start_population).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let scarcity = (1.0 - s.environment.food_security.min(s.environment.water_security))
            .clamp(0.0, 1.0);
        let cascade_stress =
            (s.planetary.severity + s.tech_risk.severity + s.nuclear.severity).min(1.0);

        let soc = &mut s.society;

        // Stability takes shocks fast and rebuilds slowly.
        soc.social_stability = (soc.social_stability - 2.0 * loss_fraction
            - 0.05 * cascade_stress
            - 0.02 * scarcity
            + 0.004)
            .clamp(0.0, 1.0);

        let econ_target = (0.75 - 0.4 * scarcity - 0.3 * cascade_stress - 0.4 * soc.war_intensity)
            .clamp(0.0, 1.0);
        soc.economic_security += (econ_target - soc.economic_security) * 0.05;

        // Healthcare collapses under mass-casualty months, otherwise
        // creeps toward a prosperous baseline.
        if s.ledger.monthly_death_cap_reached {
            soc.healthcare_quality = (soc.healthcare_quality - 0.05).max(0.0);
        } else {
            let target = (0.55 + 0.35 * soc.economic_security).min(0.9);
            soc.healthcare_quality += (target - soc.healthcare_quality) * 0.02;
        }

        // Meaning erodes under saturation-scale technology deployment
        // and under visible collapse; stability restores it.
        soc.meaning = (soc.meaning - 0.0010 * (s.technology.deployment - 1.0).max(0.0)
            - 0.03 * cascade_stress
            + 0.006 * soc.social_stability)
            .clamp(0.0, 1.0);

        // Wars burn out unless something reignites them.
        soc.war_intensity = (soc.war_intensity * 0.97).max(0.02);

        Ok(PhaseResult::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_mass_deaths_crater_stability() {
        let mut state = SimulationState::default();
        state.ledger.begin_month();
        state.ledger.monthly_deaths_applied = 0.8; // 10% of 8.1B gone
        let before = state.society.social_stability;

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        SocietyPhase.execute(&mut state, &mut rng, &PhaseContext { month: 0 }).unwrap();
        assert!(state.society.social_stability < before - 0.15);
    }

    #[test]
    fn test_war_intensity_decays_in_peace() {
        let mut state = SimulationState::default();
        state.society.war_intensity = 1.0;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for month in 0..120 {
            SocietyPhase.execute(&mut state, &mut rng, &PhaseContext { month }).unwrap();
        }
        assert!(state.society.war_intensity < 0.05);
    }
}
