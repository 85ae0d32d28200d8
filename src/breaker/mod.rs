//! Circuit breaker chain
//!
//! Gates the nuclear-escalation transition behind layered,
//! independently-failable safeguards. Each deployed layer is one
//! attacker/defender contest: a single RNG draw against a bypass
//! probability derived from attacker capability and layer strength.
//! Any single block short-circuits the whole attempt.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Bypass probability ceiling. A maintained layer always retains some
/// chance of holding, however capable the attacker.
pub const MAX_BYPASS_PROBABILITY: f64 = 0.95;

/// Effectiveness bounds for a deployed layer
pub const MIN_EFFECTIVENESS: f64 = 0.05;
pub const MAX_EFFECTIVENESS: f64 = 0.99;

/// Monthly effectiveness decay per unit of attacker capability
const TECHNICAL_DECAY_RATE: f64 = 0.010;
const PROCEDURAL_DECAY_RATE: f64 = 0.004;

/// Monthly effectiveness gain per unit of sustained investment
const IMPROVEMENT_RATE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    HumanVeto,
    TwoKeyAuthorization,
    CoolingOffDelay,
    KillSwitch,
}

impl LayerKind {
    /// Procedural layers (people and process) erode more slowly under
    /// adversarial pressure than purely technical ones.
    pub fn class(self) -> LayerClass {
        match self {
            LayerKind::HumanVeto
            | LayerKind::TwoKeyAuthorization
            | LayerKind::CoolingOffDelay => LayerClass::Procedural,
            LayerKind::KillSwitch => LayerClass::Technical,
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LayerKind::HumanVeto => "human veto",
            LayerKind::TwoKeyAuthorization => "two-key authorization",
            LayerKind::CoolingOffDelay => "cooling-off delay",
            LayerKind::KillSwitch => "kill switch",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerClass {
    Procedural,
    Technical,
}

/// One safeguard layer in the chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeguardLayer {
    pub kind: LayerKind,
    pub deployed: bool,
    /// How well the layer works when challenged, in [0.05, 0.99]
    pub effectiveness: f64,
    /// Structural weight of the layer (institutional depth, redundancy)
    pub strength_param: f64,
}

impl SafeguardLayer {
    pub fn new(kind: LayerKind, effectiveness: f64, strength_param: f64) -> Self {
        Self { kind, deployed: true, effectiveness, strength_param }
    }

    /// Probability a given attacker slips past this layer.
    ///
    /// Monotonically decreasing in effectiveness, so strengthening a
    /// layer can never make the chain easier to bypass.
    pub fn bypass_probability(&self, attacker_capability: f64) -> f64 {
        let denominator = self.effectiveness * self.strength_param;
        if !denominator.is_finite() || denominator <= f64::EPSILON {
            return MAX_BYPASS_PROBABILITY;
        }
        let ratio = attacker_capability / denominator;
        if !ratio.is_finite() {
            return MAX_BYPASS_PROBABILITY;
        }
        ratio.clamp(0.0, MAX_BYPASS_PROBABILITY)
    }
}

/// Context for one escalation attempt
#[derive(Debug, Clone, Copy)]
pub struct EscalationContext {
    pub attacker_capability: f64,
}

/// Outcome of one run through the chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeterrenceResult {
    pub blocked: bool,
    pub blocking_layer: Option<LayerKind>,
    /// Layers the attacker got past before the verdict
    pub bypassed_layers: Vec<LayerKind>,
    pub reason: String,
}

/// Ordered chain of safeguard layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerChain {
    pub layers: Vec<SafeguardLayer>,
}

impl CircuitBreakerChain {
    /// The standard four-layer chain, strongest procedural layers first.
    pub fn standard() -> Self {
        Self {
            layers: vec![
                SafeguardLayer::new(LayerKind::HumanVeto, 0.85, 1.2),
                SafeguardLayer::new(LayerKind::TwoKeyAuthorization, 0.80, 1.1),
                SafeguardLayer::new(LayerKind::CoolingOffDelay, 0.75, 1.3),
                SafeguardLayer::new(LayerKind::KillSwitch, 0.70, 1.0),
            ],
        }
    }

    /// Run the attacker through every deployed layer in priority order.
    ///
    /// One RNG draw per layer; the first block short-circuits.
    pub fn evaluate(&self, ctx: &EscalationContext, rng: &mut ChaCha8Rng) -> DeterrenceResult {
        let mut bypassed_layers = Vec::new();

        for layer in self.layers.iter().filter(|l| l.deployed) {
            let bypass = layer.bypass_probability(ctx.attacker_capability);
            if rng.gen::<f64>() < bypass {
                bypassed_layers.push(layer.kind);
                continue;
            }
            return DeterrenceResult {
                blocked: true,
                blocking_layer: Some(layer.kind),
                bypassed_layers,
                reason: format!("{} held", layer.kind),
            };
        }

        DeterrenceResult {
            blocked: false,
            blocking_layer: None,
            bypassed_layers,
            reason: "all deployed layers bypassed".to_string(),
        }
    }

    /// Monthly adversarial-learning vs. investment update.
    ///
    /// Decay scales with attacker capability; procedural layers are
    /// more durable than technical ones. Jitter keeps parallel runs
    /// from eroding in lockstep.
    pub fn update_monthly(
        &mut self,
        attacker_capability: f64,
        investment: f64,
        rng: &mut ChaCha8Rng,
    ) {
        let capability = if attacker_capability.is_finite() {
            attacker_capability.max(0.0)
        } else {
            0.0
        };
        let investment = if investment.is_finite() { investment.clamp(0.0, 1.0) } else { 0.0 };

        for layer in self.layers.iter_mut().filter(|l| l.deployed) {
            let decay_rate = match layer.kind.class() {
                LayerClass::Procedural => PROCEDURAL_DECAY_RATE,
                LayerClass::Technical => TECHNICAL_DECAY_RATE,
            };
            let jitter = 0.9 + rng.gen::<f64>() * 0.2;
            let decay = capability * decay_rate * jitter;
            let improvement = investment * IMPROVEMENT_RATE;
            layer.effectiveness = (layer.effectiveness - decay + improvement)
                .clamp(MIN_EFFECTIVENESS, MAX_EFFECTIVENESS);
        }
    }

    /// Cheap aggregate safeguard strength: `1 - prod(1 - eff_i)` over
    /// deployed layers. Used by reporting code that needs a risk
    /// multiplier without re-running the stochastic contest.
    pub fn aggregate_strength(&self) -> f64 {
        let survival: f64 = self
            .layers
            .iter()
            .filter(|l| l.deployed)
            .map(|l| 1.0 - l.effectiveness)
            .product();
        1.0 - survival
    }

    pub fn deployed_count(&self) -> usize {
        self.layers.iter().filter(|l| l.deployed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_bypass_probability_monotone_in_effectiveness() {
        let mut weak = SafeguardLayer::new(LayerKind::KillSwitch, 0.3, 1.0);
        let strong = SafeguardLayer::new(LayerKind::KillSwitch, 0.9, 1.0);
        assert!(strong.bypass_probability(0.5) < weak.bypass_probability(0.5));

        // Degenerate effectiveness falls back to the ceiling.
        weak.effectiveness = 0.0;
        assert_eq!(weak.bypass_probability(0.5), MAX_BYPASS_PROBABILITY);
        assert_eq!(weak.bypass_probability(f64::NAN), MAX_BYPASS_PROBABILITY);
    }

    #[test]
    fn test_evaluate_short_circuits_on_block() {
        let chain = CircuitBreakerChain {
            layers: vec![
                // Unbypassable first layer: attacker capability 0.
                SafeguardLayer::new(LayerKind::HumanVeto, 0.9, 1.0),
                SafeguardLayer::new(LayerKind::KillSwitch, 0.9, 1.0),
            ],
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let result = chain.evaluate(&EscalationContext { attacker_capability: 0.0 }, &mut rng);
        assert!(result.blocked);
        assert_eq!(result.blocking_layer, Some(LayerKind::HumanVeto));
        assert!(result.bypassed_layers.is_empty());
    }

    #[test]
    fn test_overwhelming_attacker_bypasses_everything_eventually() {
        let chain = CircuitBreakerChain::standard();
        let ctx = EscalationContext { attacker_capability: 100.0 };
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        // Every layer sits at the 0.95 bypass ceiling, so over many
        // attempts some sail through all four layers.
        let breaches = (0..500)
            .filter(|_| !chain.evaluate(&ctx, &mut rng).blocked)
            .count();
        assert!(breaches > 300, "expected mostly breaches, got {breaches}");
    }

    #[test]
    fn test_undeployed_layers_are_skipped() {
        let mut chain = CircuitBreakerChain::standard();
        for layer in &mut chain.layers {
            layer.deployed = false;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let result = chain.evaluate(&EscalationContext { attacker_capability: 0.1 }, &mut rng);
        assert!(!result.blocked, "empty chain cannot block");
        assert_eq!(chain.aggregate_strength(), 0.0);
    }

    #[test]
    fn test_monthly_update_durability_by_class() {
        let mut chain = CircuitBreakerChain {
            layers: vec![
                SafeguardLayer::new(LayerKind::CoolingOffDelay, 0.8, 1.0),
                SafeguardLayer::new(LayerKind::KillSwitch, 0.8, 1.0),
            ],
        };
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..24 {
            chain.update_monthly(1.5, 0.0, &mut rng);
        }
        let procedural = chain.layers[0].effectiveness;
        let technical = chain.layers[1].effectiveness;
        assert!(
            procedural > technical,
            "procedural layer should outlast technical: {procedural} vs {technical}"
        );
        assert!(technical >= MIN_EFFECTIVENESS);
    }

    #[test]
    fn test_aggregate_strength_formula() {
        let chain = CircuitBreakerChain {
            layers: vec![
                SafeguardLayer::new(LayerKind::HumanVeto, 0.5, 1.0),
                SafeguardLayer::new(LayerKind::KillSwitch, 0.5, 1.0),
            ],
        };
        assert!((chain.aggregate_strength() - 0.75).abs() < 1e-12);
    }
}
