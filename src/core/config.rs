//! Simulation configuration with documented constants
//!
//! Tunable rates are collected here with explanations of their purpose
//! and how they interact with each other. Hard invariant constants
//! (death cap fraction, population thresholds) live next to the code
//! that enforces them.

use serde::{Deserialize, Serialize};

/// Tunable parameters for one simulation run
///
/// These values have been calibrated so a baseline run (no cascade, no
/// escalation) reproduces roughly present-day demographic behavior:
/// slow growth flattening toward carrying capacity over a few decades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    // === POPULATION ===
    /// Carrying capacity of an undamaged planet (billions)
    ///
    /// Environmental and technological modifiers scale this up or down
    /// each month; the product is the capacity the ledger compares the
    /// stock against for overshoot die-off.
    pub base_carrying_capacity: f64,

    /// Baseline monthly birth rate (fraction of stock per month)
    ///
    /// 0.00135/month is about 1.6 %/year, the approximate world crude
    /// birth rate. Society modifiers and the seasonal cycle move the
    /// effective rate around this anchor.
    pub baseline_birth_rate: f64,

    /// Baseline monthly death rate (fraction of stock per month)
    ///
    /// 0.00063/month is about 0.75 %/year. Healthcare reduces it, war
    /// and the seasonal cycle raise it; environmental mortality is
    /// added on top, never multiplied in.
    pub baseline_death_rate: f64,

    /// Amplitude of the sinusoidal seasonal birth cycle (fraction)
    pub birth_seasonal_amplitude: f64,

    /// Amplitude of the sinusoidal seasonal mortality cycle (fraction)
    pub death_seasonal_amplitude: f64,

    /// Half-width of the uniform monthly noise applied to the birth rate
    ///
    /// Kept small: noise represents measurement-scale wobble, not a
    /// demographic driver.
    pub birth_noise_amplitude: f64,

    /// Fraction of the population excess above carrying capacity that
    /// dies per month while in overshoot (Malthusian correction)
    pub overshoot_dieoff_rate: f64,

    /// Coefficient of the resilience floor
    ///
    /// Additional (non-baseline) mortality is multiplied by
    /// `max(0, 1 - cumulative_mortality_fraction * coefficient)`.
    /// Survivor populations get progressively harder to kill, which
    /// prevents unbounded compounding death spirals.
    pub resilience_floor_coefficient: f64,

    // === TECHNOLOGY / DETERRENCE ===
    /// Monthly compound growth rate of frontier capability
    pub capability_growth_rate: f64,

    /// Sustained monthly investment into safeguard layers (0..1)
    ///
    /// Feeds the circuit breaker chain's monthly improvement term.
    pub safeguard_investment: f64,

    /// Floor probability of a nuclear escalation attempt in a calm month
    ///
    /// Tension risk and an active nuclear cascade raise the effective
    /// attempt probability well above this.
    pub escalation_base_probability: f64,

    /// Mortality rate of an unblocked nuclear exchange (fraction of the
    /// exposed population)
    pub escalation_mortality_rate: f64,

    /// Fraction of the world population exposed to a nuclear exchange
    pub escalation_exposed_fraction: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_carrying_capacity: 11.5,
            baseline_birth_rate: 0.00135,
            baseline_death_rate: 0.00063,
            birth_seasonal_amplitude: 0.03,
            death_seasonal_amplitude: 0.04,
            birth_noise_amplitude: 0.005,
            overshoot_dieoff_rate: 0.05,
            resilience_floor_coefficient: 0.5,
            capability_growth_rate: 0.004,
            safeguard_investment: 0.3,
            escalation_base_probability: 0.002,
            escalation_mortality_rate: 0.12,
            escalation_exposed_fraction: 0.85,
        }
    }
}
