//! Integration tests for the circuit breaker chain
//!
//! The monotonicity guarantee matters most: hardening a layer must
//! never make the chain easier to get through.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use worldline::breaker::{
    CircuitBreakerChain, EscalationContext, LayerKind, SafeguardLayer,
};

fn blocked_count(chain: &CircuitBreakerChain, attacker: f64, trials: u64) -> usize {
    let ctx = EscalationContext { attacker_capability: attacker };
    (0..trials)
        .filter(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(*seed);
            chain.evaluate(&ctx, &mut rng).blocked
        })
        .count()
}

#[test]
fn test_hardening_a_layer_never_hurts() {
    let weak = CircuitBreakerChain {
        layers: vec![
            SafeguardLayer::new(LayerKind::HumanVeto, 0.40, 1.0),
            SafeguardLayer::new(LayerKind::KillSwitch, 0.40, 1.0),
        ],
    };
    let mut strong = weak.clone();
    strong.layers[0].effectiveness = 0.90;

    // Identical seed streams for both chains; only effectiveness moved.
    let weak_blocks = blocked_count(&weak, 0.5, 2000);
    let strong_blocks = blocked_count(&strong, 0.5, 2000);
    assert!(
        strong_blocks >= weak_blocks,
        "hardened chain blocked {strong_blocks} < weak chain {weak_blocks}"
    );
}

#[test]
fn test_block_rate_tracks_attacker_capability() {
    let chain = CircuitBreakerChain::standard();
    let vs_weak_attacker = blocked_count(&chain, 0.2, 2000);
    let vs_strong_attacker = blocked_count(&chain, 1.5, 2000);
    assert!(vs_weak_attacker > vs_strong_attacker);
}

#[test]
fn test_deterrence_result_reports_bypassed_layers() {
    let chain = CircuitBreakerChain::standard();
    let ctx = EscalationContext { attacker_capability: 2.5 };

    for seed in 0..200 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let result = chain.evaluate(&ctx, &mut rng);
        if result.blocked {
            // The blocker is not among the bypassed.
            let blocker = result.blocking_layer.expect("blocked implies blocker");
            assert!(!result.bypassed_layers.contains(&blocker));
        } else {
            assert_eq!(result.bypassed_layers.len(), chain.deployed_count());
        }
    }
}

#[test]
fn test_sustained_pressure_weakens_then_investment_recovers() {
    let mut chain = CircuitBreakerChain::standard();
    let before = chain.aggregate_strength();

    let mut rng = ChaCha8Rng::seed_from_u64(17);
    for _ in 0..36 {
        chain.update_monthly(2.0, 0.0, &mut rng);
    }
    let eroded = chain.aggregate_strength();
    assert!(eroded < before);

    for _ in 0..120 {
        chain.update_monthly(0.0, 1.0, &mut rng);
    }
    let recovered = chain.aggregate_strength();
    assert!(recovered > eroded);
}
