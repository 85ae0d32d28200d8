//! Planetary boundary cascade instance
//!
//! Nine signals following the planetary-boundaries framework, with
//! climate change and biosphere integrity as the two core boundaries.
//! Signal values are pressure relative to the safe operating limit;
//! baselines start several boundaries already breached, matching the
//! present-day assessment.

use crate::core::types::{CascadeSystem, RootCause};

use super::{CascadeModel, RiskSignal};

pub const CLIMATE_CHANGE: &str = "climate_change";
pub const BIOSPHERE_INTEGRITY: &str = "biosphere_integrity";
pub const LAND_SYSTEM_CHANGE: &str = "land_system_change";
pub const FRESHWATER_USE: &str = "freshwater_use";
pub const BIOGEOCHEMICAL_FLOWS: &str = "biogeochemical_flows";
pub const OCEAN_ACIDIFICATION: &str = "ocean_acidification";
pub const ATMOSPHERIC_AEROSOLS: &str = "atmospheric_aerosols";
pub const STRATOSPHERIC_OZONE: &str = "stratospheric_ozone";
pub const NOVEL_ENTITIES: &str = "novel_entities";

/// Monthly mortality rate at full severity
const MORTALITY_SCALE: f64 = 0.003;

pub fn planetary_boundaries() -> CascadeModel {
    let signals = vec![
        RiskSignal::new(CLIMATE_CHANGE, 1.22, 1.0, 1.5, true),
        RiskSignal::new(BIOSPHERE_INTEGRITY, 1.55, 1.0, 1.5, true),
        RiskSignal::new(LAND_SYSTEM_CHANGE, 1.12, 1.0, 1.5, false),
        RiskSignal::new(FRESHWATER_USE, 1.04, 1.0, 1.5, false),
        RiskSignal::new(BIOGEOCHEMICAL_FLOWS, 1.70, 1.0, 1.5, false),
        RiskSignal::new(OCEAN_ACIDIFICATION, 0.98, 1.0, 1.5, false),
        RiskSignal::new(ATMOSPHERIC_AEROSOLS, 0.86, 1.0, 1.5, false),
        RiskSignal::new(STRATOSPHERIC_OZONE, 0.72, 1.0, 1.5, false),
        RiskSignal::new(NOVEL_ENTITIES, 1.28, 1.0, 1.5, false),
    ];
    CascadeModel::new(
        CascadeSystem::PlanetaryBoundaries,
        signals,
        MORTALITY_SCALE,
        vec![(RootCause::ClimateChange, 0.7), (RootCause::Natural, 0.3)],
    )
}
