//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation time unit: months elapsed since the start of a run
pub type Month = u32;

/// Death accounting category (what killed people)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCategory {
    War,
    Famine,
    Disasters,
    Disease,
    Ecosystem,
    Pollution,
    Ai,
    Cascade,
    Other,
}

impl DeathCategory {
    pub const ALL: [DeathCategory; 9] = [
        DeathCategory::War,
        DeathCategory::Famine,
        DeathCategory::Disasters,
        DeathCategory::Disease,
        DeathCategory::Ecosystem,
        DeathCategory::Pollution,
        DeathCategory::Ai,
        DeathCategory::Cascade,
        DeathCategory::Other,
    ];
}

/// Death attribution root cause (why it happened)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootCause {
    ClimateChange,
    Conflict,
    Governance,
    Alignment,
    Natural,
    Poverty,
    Other,
}

impl RootCause {
    pub const ALL: [RootCause; 7] = [
        RootCause::ClimateChange,
        RootCause::Conflict,
        RootCause::Governance,
        RootCause::Alignment,
        RootCause::Natural,
        RootCause::Poverty,
        RootCause::Other,
    ];
}

/// Which cascade instance an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeSystem {
    PlanetaryBoundaries,
    TechnologicalRisk,
    NuclearTension,
}

impl std::fmt::Display for CascadeSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CascadeSystem::PlanetaryBoundaries => write!(f, "planetary boundaries"),
            CascadeSystem::TechnologicalRisk => write!(f, "technological risk"),
            CascadeSystem::NuclearTension => write!(f, "nuclear tension"),
        }
    }
}
