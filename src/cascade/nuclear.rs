//! Nuclear tension cascade instance
//!
//! An active nuclear-tension cascade does not itself fire weapons; it
//! raises the escalation-attempt probability the deterrence phase
//! feeds into the circuit breaker chain. Its own mortality coupling is
//! small (mobilization, proxy conflict, sanctions famine).

use crate::core::types::{CascadeSystem, RootCause};

use super::{CascadeModel, RiskSignal};

pub const ARSENAL_POSTURE: &str = "arsenal_posture";
pub const TREATY_EROSION: &str = "treaty_erosion";
pub const ACTIVE_FLASHPOINTS: &str = "active_flashpoints";
pub const EARLY_WARNING_DEGRADATION: &str = "early_warning_degradation";
pub const DOCTRINE_AMBIGUITY: &str = "doctrine_ambiguity";

const MORTALITY_SCALE: f64 = 0.001;

pub fn nuclear_tension() -> CascadeModel {
    let signals = vec![
        RiskSignal::new(ARSENAL_POSTURE, 1.05, 1.0, 1.5, true),
        RiskSignal::new(ACTIVE_FLASHPOINTS, 0.92, 1.0, 1.5, true),
        RiskSignal::new(TREATY_EROSION, 1.20, 1.0, 1.5, false),
        RiskSignal::new(EARLY_WARNING_DEGRADATION, 0.80, 1.0, 1.5, false),
        RiskSignal::new(DOCTRINE_AMBIGUITY, 1.08, 1.0, 1.5, false),
    ];
    CascadeModel::new(
        CascadeSystem::NuclearTension,
        signals,
        MORTALITY_SCALE,
        vec![(RootCause::Conflict, 0.9), (RootCause::Governance, 0.1)],
    )
}
