//! TOML-loadable initial-state overrides
//!
//! A scenario file tweaks the baseline world before a run or sweep:
//!
//! ```toml
//! start_population = 7.5
//! attacker_capability = 0.8
//! undeployed_layers = ["kill_switch"]
//!
//! [boundaries]
//! climate_change = 1.4
//!
//! [[segments]]
//! name = "global_south_coastal"
//! share = 0.3
//! vulnerability_multiplier = 1.8
//! survival_rate = 0.6
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::breaker::LayerKind;
use crate::core::error::{Result, WorldlineError};
use crate::ledger::PopulationSegment;
use crate::state::SimulationState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub start_population: Option<f64>,
    pub attacker_capability: Option<f64>,
    pub safeguard_investment: Option<f64>,
    #[serde(default)]
    pub undeployed_layers: Vec<LayerKind>,
    /// Planetary boundary pressure overrides by signal name
    #[serde(default)]
    pub boundaries: BTreeMap<String, f64>,
    #[serde(default)]
    pub segments: Vec<SegmentScenario>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentScenario {
    pub name: String,
    pub share: f64,
    pub vulnerability_multiplier: f64,
    pub survival_rate: f64,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Apply the overrides to a freshly built state.
    pub fn apply(&self, state: &mut SimulationState) -> Result<()> {
        if let Some(population) = self.start_population {
            if !population.is_finite() || population <= 0.0 {
                return Err(WorldlineError::Scenario(format!(
                    "start_population must be finite and positive, got {population}"
                )));
            }
            state.ledger = crate::ledger::PopulationLedger::new(population);
        }
        if let Some(capability) = self.attacker_capability {
            state.deterrence.base_attacker_capability = capability;
            state.deterrence.attacker_capability = capability;
        }
        if let Some(investment) = self.safeguard_investment {
            state.config.safeguard_investment = investment;
        }
        for kind in &self.undeployed_layers {
            for layer in &mut state.deterrence.chain.layers {
                if layer.kind == *kind {
                    layer.deployed = false;
                }
            }
        }
        for (name, value) in &self.boundaries {
            let signal = state
                .planetary
                .signal_mut(name)
                .ok_or_else(|| {
                    WorldlineError::Scenario(format!("unknown planetary boundary '{name}'"))
                })?;
            signal.update_value(*value);
        }
        if !self.segments.is_empty() {
            state.ledger.segments = self
                .segments
                .iter()
                .map(|s| PopulationSegment {
                    name: s.name.clone(),
                    share: s.share,
                    vulnerability_multiplier: s.vulnerability_multiplier,
                    survival_rate: s.survival_rate,
                })
                .collect();
        }
        state.planetary.compute_risk();
        state.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let toml_text = r#"
            start_population = 7.5
            attacker_capability = 0.8
            undeployed_layers = ["kill_switch"]

            [boundaries]
            climate_change = 1.4
        "#;
        let scenario: Scenario = toml::from_str(toml_text).unwrap();
        let mut state = SimulationState::default();
        scenario.apply(&mut state).unwrap();

        assert!((state.ledger.population - 7.5).abs() < 1e-12);
        assert!((state.deterrence.attacker_capability - 0.8).abs() < 1e-12);
        let kill_switch = state
            .deterrence
            .chain
            .layers
            .iter()
            .find(|l| l.kind == LayerKind::KillSwitch)
            .unwrap();
        assert!(!kill_switch.deployed);
        let climate = state.planetary.signal_mut("climate_change").unwrap();
        assert!((climate.value - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_boundary_rejected() {
        let mut scenario = Scenario::default();
        scenario.boundaries.insert("plate_tectonics".into(), 1.0);
        let mut state = SimulationState::default();
        assert!(scenario.apply(&mut state).is_err());
    }

    #[test]
    fn test_bad_segment_shares_rejected() {
        let mut scenario = Scenario::default();
        scenario.segments.push(SegmentScenario {
            name: "half".into(),
            share: 0.5,
            vulnerability_multiplier: 1.0,
            survival_rate: 1.0,
        });
        let mut state = SimulationState::default();
        assert!(scenario.apply(&mut state).is_err(), "shares must sum to 1");
    }
}
