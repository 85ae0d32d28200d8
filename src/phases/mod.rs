//! The standard monthly pipeline
//!
//! Each sub-module is one [`Phase`]. External business-rule modules
//! plug into the same scheduler through the same trait; nothing here
//! is special beyond being shipped by default.
//!
//! Execution order (fractional, ascending):
//! 1.0 environment, 2.0 society, 3.0 technology, 5.0/5.5/6.0 cascades,
//! 6.5 deterrence, 8.0 population.

pub mod cascades;
pub mod deterrence;
pub mod environment;
pub mod population;
pub mod society;
pub mod technology;

use crate::core::error::Result;
use crate::core::types::CascadeSystem;
use crate::scheduler::Scheduler;

pub use cascades::CascadePhase;
pub use deterrence::DeterrencePhase;
pub use environment::EnvironmentPhase;
pub use population::PopulationPhase;
pub use society::SocietyPhase;
pub use technology::TechnologyPhase;

/// Build a scheduler with the full shipped pipeline registered.
pub fn standard_pipeline() -> Result<Scheduler> {
    let mut scheduler = Scheduler::new();
    scheduler.register(Box::new(EnvironmentPhase))?;
    scheduler.register(Box::new(SocietyPhase))?;
    scheduler.register(Box::new(TechnologyPhase))?;
    scheduler.register(Box::new(CascadePhase::new(CascadeSystem::PlanetaryBoundaries, 5.0)))?;
    scheduler.register(Box::new(CascadePhase::new(CascadeSystem::TechnologicalRisk, 5.5)))?;
    scheduler.register(Box::new(CascadePhase::new(CascadeSystem::NuclearTension, 6.0)))?;
    scheduler.register(Box::new(DeterrencePhase))?;
    scheduler.register(Box::new(PopulationPhase::new()))?;
    Ok(scheduler)
}
