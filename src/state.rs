//! The shared world state advanced one month at a time
//!
//! Exactly one `SimulationState` exists per run. The scheduler passes
//! it by exclusive reference to each phase in turn; all coupling
//! between phases happens through the values a later phase reads here,
//! never through control flow.

use serde::Serialize;

use crate::breaker::CircuitBreakerChain;
use crate::cascade::{self, CascadeModel};
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, WorldlineError};
use crate::core::types::Month;
use crate::ledger::PopulationLedger;

/// Physical environment the population depends on. All level values
/// are normalized to [0, 1].
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentState {
    pub climate_stability: f64,
    pub food_security: f64,
    pub water_security: f64,
    pub ecosystem_health: f64,
    /// Pollution pressure, 0 = pristine
    pub pollution_load: f64,
    /// Monthly mortality rate the environment adds to the demographic
    /// baseline; recomputed by the environment phase each month.
    pub environmental_mortality_rate: f64,
}

impl Default for EnvironmentState {
    fn default() -> Self {
        Self {
            climate_stability: 0.95,
            food_security: 0.92,
            water_security: 0.93,
            ecosystem_health: 0.78,
            pollution_load: 0.35,
            environmental_mortality_rate: 0.0,
        }
    }
}

/// Social conditions feeding the birth/death rate composition
#[derive(Debug, Clone, Serialize)]
pub struct SocietyState {
    /// Sense of meaning and purpose
    pub meaning: f64,
    pub economic_security: f64,
    pub healthcare_quality: f64,
    pub social_stability: f64,
    /// Intensity of ongoing armed conflict, 0 = peace
    pub war_intensity: f64,
}

impl Default for SocietyState {
    fn default() -> Self {
        Self {
            meaning: 0.60,
            economic_security: 0.55,
            healthcare_quality: 0.70,
            social_stability: 0.65,
            war_intensity: 0.05,
        }
    }
}

/// Frontier technology levels
#[derive(Debug, Clone, Serialize)]
pub struct TechnologyState {
    /// Frontier capability index, 1.0 at run start
    pub capability: f64,
    /// Cumulative safety/control research, grows with investment
    pub control_research: f64,
    /// How widely frontier systems are deployed, normalized pressure
    pub deployment: f64,
}

impl Default for TechnologyState {
    fn default() -> Self {
        Self { capability: 1.0, control_research: 0.9, deployment: 1.06 }
    }
}

/// Deterrence posture: the breaker chain plus the adversarial context
/// it is evaluated against
#[derive(Debug, Clone, Serialize)]
pub struct DeterrenceState {
    pub chain: CircuitBreakerChain,
    /// Configured floor of attacker capability; scenario-overridable
    pub base_attacker_capability: f64,
    /// Effective capability of whoever is trying to force an escalation
    /// through; recomputed monthly from the base plus frontier-technology
    /// contributions
    pub attacker_capability: f64,
    pub escalation_attempts: u32,
    pub escalations_blocked: u32,
    /// An exchange has happened; a terminal scar on the run
    pub escalation_occurred: bool,
}

impl Default for DeterrenceState {
    fn default() -> Self {
        Self {
            chain: CircuitBreakerChain::standard(),
            base_attacker_capability: 0.3,
            attacker_capability: 0.3,
            escalation_attempts: 0,
            escalations_blocked: 0,
            escalation_occurred: false,
        }
    }
}

/// The complete state tree for one run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationState {
    pub month: Month,
    pub config: SimulationConfig,
    pub ledger: PopulationLedger,
    pub environment: EnvironmentState,
    pub society: SocietyState,
    pub technology: TechnologyState,
    pub planetary: CascadeModel,
    pub tech_risk: CascadeModel,
    pub nuclear: CascadeModel,
    pub deterrence: DeterrenceState,
}

impl SimulationState {
    /// Baseline world: 8.1 billion people, present-day boundary
    /// pressures, the standard breaker chain deployed.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            month: 0,
            config,
            ledger: PopulationLedger::new(8.1),
            environment: EnvironmentState::default(),
            society: SocietyState::default(),
            technology: TechnologyState::default(),
            planetary: cascade::planetary::planetary_boundaries(),
            tech_risk: cascade::technological::technological_risk(),
            nuclear: cascade::nuclear::nuclear_tension(),
            deterrence: DeterrenceState::default(),
        }
    }

    /// Structural sanity check run once before the loop starts.
    ///
    /// A run that begins with a poisoned ledger has no meaningful
    /// recovery; fail fast with a clear diagnostic.
    pub fn validate(&self) -> Result<()> {
        if !self.ledger.population.is_finite() || self.ledger.population < 0.0 {
            return Err(WorldlineError::Structural(format!(
                "initial population must be finite and non-negative, got {}",
                self.ledger.population
            )));
        }
        if !self.ledger.segments.is_empty() {
            let share_sum: f64 = self.ledger.segments.iter().map(|s| s.share).sum();
            if !share_sum.is_finite() || (share_sum - 1.0).abs() > 0.01 {
                return Err(WorldlineError::Structural(format!(
                    "population segment shares must sum to 1.0, got {share_sum}"
                )));
            }
        }
        if self.planetary.signals.is_empty()
            || self.tech_risk.signals.is_empty()
            || self.nuclear.signals.is_empty()
        {
            return Err(WorldlineError::Structural(
                "cascade models must have at least one signal".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}
