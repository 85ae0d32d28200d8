//! Technological risk cascade instance
//!
//! Signals track how far frontier capability has outrun control. The
//! capability-control gap and alignment drift are core: both breached
//! together means systems that can neither be steered nor understood.

use crate::core::types::{CascadeSystem, RootCause};

use super::{CascadeModel, RiskSignal};

pub const CAPABILITY_CONTROL_GAP: &str = "capability_control_gap";
pub const ALIGNMENT_DRIFT: &str = "alignment_drift";
pub const DEPLOYMENT_BREADTH: &str = "deployment_breadth";
pub const INTERPRETABILITY_SHORTFALL: &str = "interpretability_shortfall";
pub const COMPUTE_CONCENTRATION: &str = "compute_concentration";

const MORTALITY_SCALE: f64 = 0.004;

pub fn technological_risk() -> CascadeModel {
    let signals = vec![
        RiskSignal::new(CAPABILITY_CONTROL_GAP, 0.90, 1.0, 1.5, true),
        RiskSignal::new(ALIGNMENT_DRIFT, 0.84, 1.0, 1.5, true),
        RiskSignal::new(DEPLOYMENT_BREADTH, 1.06, 1.0, 1.5, false),
        RiskSignal::new(INTERPRETABILITY_SHORTFALL, 0.92, 1.0, 1.5, false),
        RiskSignal::new(COMPUTE_CONCENTRATION, 1.10, 1.0, 1.5, false),
    ];
    CascadeModel::new(
        CascadeSystem::TechnologicalRisk,
        signals,
        MORTALITY_SCALE,
        vec![(RootCause::Alignment, 0.8), (RootCause::Governance, 0.2)],
    )
}
