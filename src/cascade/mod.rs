//! Cascade risk model
//!
//! Turns N independent boundary/risk signals into one systemic cascade
//! state machine. Instantiated three times (planetary boundaries,
//! technological risk, nuclear tension); the instances share this
//! aggregation, trigger, severity and hysteresis logic and differ only
//! in their signal sets and mortality couplings.

pub mod nuclear;
pub mod planetary;
pub mod technological;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::types::{CascadeSystem, DeathCategory, Month, RootCause};
use crate::ledger::{CrisisOutcome, MortalitySink};
use crate::scheduler::events::EventType;

/// Base systemic risk by number of breached signals.
///
/// Monotonic step table; the index is clamped at 9 for larger signal
/// sets. Even a fully breached system never reaches certainty.
pub const BASE_RISK_BY_BREACH_COUNT: [f64; 10] =
    [0.00, 0.02, 0.05, 0.10, 0.18, 0.28, 0.42, 0.60, 0.78, 0.95];

/// Added when at least two core signals are breached at once. Core
/// signals interact; losing two of them is qualitatively worse than
/// the breach count alone suggests.
pub const CORE_BREACH_BONUS: f64 = 0.50;

/// Added per signal sitting in the high-risk zone
pub const HIGH_RISK_BONUS: f64 = 0.04;

/// Added per signal with a worsening trend
pub const WORSENING_TREND_BONUS: f64 = 0.02;

/// Aggregate risk ceiling, strictly below 1
pub const RISK_CAP: f64 = 0.98;

/// Risk below this cannot trigger a cascade at all
pub const TRIGGER_THRESHOLD: f64 = 0.5;

/// Per-month trigger probability ceiling. The trigger is a Bernoulli
/// trial, not a deterministic crossing, so correlated Monte-Carlo
/// trajectories spread their trigger months out.
pub const MAX_TRIGGER_PROBABILITY: f64 = 0.10;

/// Deactivation threshold, strictly below [`TRIGGER_THRESHOLD`].
/// The gap is the hysteresis band that prevents chattering.
pub const DEACTIVATION_THRESHOLD: f64 = 0.35;

/// Multiplicative severity jitter half-width (exogenous shocks)
pub const SEVERITY_JITTER: f64 = 0.20;

/// Months an active cascade runs before severity starts compounding
pub const ACCELERATION_GRACE_MONTHS: u32 = 48;

/// Monthly compounding rate after the grace period
pub const ACCELERATION_RATE: f64 = 0.015;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Safe,
    Beyond,
    HighRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Worsening,
}

/// One boundary/risk signal, normalized so higher is worse.
///
/// `value` is pressure relative to the safe operating limit: 1.0 sits
/// exactly on the boundary, above `high_risk_limit` the signal is in
/// the high-risk zone.
#[derive(Debug, Clone, Serialize)]
pub struct RiskSignal {
    pub name: &'static str,
    pub value: f64,
    pub safe_limit: f64,
    pub high_risk_limit: f64,
    pub status: SignalStatus,
    pub trend: Trend,
    pub is_core: bool,
}

impl RiskSignal {
    pub fn new(
        name: &'static str,
        value: f64,
        safe_limit: f64,
        high_risk_limit: f64,
        is_core: bool,
    ) -> Self {
        let mut signal = Self {
            name,
            value,
            safe_limit,
            high_risk_limit,
            status: SignalStatus::Safe,
            trend: Trend::Stable,
            is_core,
        };
        signal.status = signal.status_for(value);
        signal
    }

    fn status_for(&self, value: f64) -> SignalStatus {
        if value <= self.safe_limit {
            SignalStatus::Safe
        } else if value <= self.high_risk_limit {
            SignalStatus::Beyond
        } else {
            SignalStatus::HighRisk
        }
    }

    pub fn breached(&self) -> bool {
        self.status != SignalStatus::Safe
    }

    /// Set a new value, recomputing status and trend.
    ///
    /// Non-finite input is ignored; a poisoned upstream computation
    /// must not corrupt the risk aggregation.
    pub fn update_value(&mut self, value: f64) {
        if !value.is_finite() {
            tracing::warn!(signal = self.name, value, "ignored non-finite signal value");
            return;
        }
        const EPSILON: f64 = 1e-4;
        self.trend = if value > self.value + EPSILON {
            Trend::Worsening
        } else if value < self.value - EPSILON {
            Trend::Improving
        } else {
            Trend::Stable
        };
        self.value = value;
        self.status = self.status_for(value);
    }
}

/// Cascade state machine over a set of risk signals
#[derive(Debug, Clone, Serialize)]
pub struct CascadeModel {
    pub system: CascadeSystem,
    pub signals: Vec<RiskSignal>,
    /// Aggregate systemic risk in [0, RISK_CAP]
    pub risk: f64,
    pub cascade_active: bool,
    /// Bounded severity in [0, 1]; 0 whenever inactive
    pub severity: f64,
    pub start_month: Option<Month>,
    /// Monthly mortality rate at severity 1.0 while active
    pub mortality_scale: f64,
    /// Root-cause mix cascade deaths are attributed to
    pub cause_mix: Vec<(RootCause, f64)>,
}

impl CascadeModel {
    pub fn new(
        system: CascadeSystem,
        signals: Vec<RiskSignal>,
        mortality_scale: f64,
        cause_mix: Vec<(RootCause, f64)>,
    ) -> Self {
        let mut model = Self {
            system,
            signals,
            risk: 0.0,
            cascade_active: false,
            severity: 0.0,
            start_month: None,
            mortality_scale,
            cause_mix,
        };
        model.compute_risk();
        model
    }

    pub fn signal_mut(&mut self, name: &str) -> Option<&mut RiskSignal> {
        self.signals.iter_mut().find(|s| s.name == name)
    }

    pub fn months_active(&self, month: Month) -> u32 {
        self.start_month.map(|start| month.saturating_sub(start)).unwrap_or(0)
    }

    /// Recompute the aggregate risk scalar from the current signals.
    pub fn compute_risk(&mut self) -> f64 {
        let breached = self.signals.iter().filter(|s| s.breached()).count();
        let core_breached = self.signals.iter().filter(|s| s.is_core && s.breached()).count();
        let high_risk = self
            .signals
            .iter()
            .filter(|s| s.status == SignalStatus::HighRisk)
            .count();
        let worsening = self.signals.iter().filter(|s| s.trend == Trend::Worsening).count();

        let index = breached.min(BASE_RISK_BY_BREACH_COUNT.len() - 1);
        let mut risk = BASE_RISK_BY_BREACH_COUNT[index];
        if core_breached >= 2 {
            risk += CORE_BREACH_BONUS;
        }
        risk += high_risk as f64 * HIGH_RISK_BONUS;
        risk += worsening as f64 * WORSENING_TREND_BONUS;

        self.risk = risk.min(RISK_CAP);
        self.risk
    }

    /// One Bernoulli trial for cascade activation.
    ///
    /// Probability ramps quadratically from 0 at the trigger threshold
    /// to [`MAX_TRIGGER_PROBABILITY`] at maximum risk. Idempotent while
    /// active (no double trigger).
    pub fn maybe_trigger(&mut self, month: Month, rng: &mut ChaCha8Rng) -> bool {
        if self.cascade_active || self.risk <= TRIGGER_THRESHOLD {
            return false;
        }
        let ramp = ((self.risk - TRIGGER_THRESHOLD) / (1.0 - TRIGGER_THRESHOLD)).clamp(0.0, 1.0);
        let probability = MAX_TRIGGER_PROBABILITY * ramp * ramp;
        if rng.gen::<f64>() < probability {
            self.cascade_active = true;
            self.start_month = Some(month);
            self.severity = 0.1;
            return true;
        }
        false
    }

    /// Evolve severity while active: risk-coupled with bounded jitter,
    /// compounding after the grace period, capped at 1.
    pub fn update_severity(&mut self, month: Month, rng: &mut ChaCha8Rng) {
        if !self.cascade_active {
            return;
        }
        let jitter = 1.0 + (rng.gen::<f64>() * 2.0 - 1.0) * SEVERITY_JITTER;
        let mut severity = self.risk * jitter;

        let active = self.months_active(month);
        if active > ACCELERATION_GRACE_MONTHS {
            let overtime = (active - ACCELERATION_GRACE_MONTHS).min(240);
            severity *= (1.0 + ACCELERATION_RATE).powi(overtime as i32);
        }

        // Severity ratchets up under acceleration but never jumps past
        // the ceiling or below the risk floor it is coupled to.
        self.severity = severity.clamp(0.0, 1.0);
    }

    /// Hysteresis-gated deactivation: only below the strictly lower
    /// deactivation threshold, and severity resets in the same tick.
    pub fn maybe_reverse(&mut self) -> bool {
        if self.cascade_active && self.risk < DEACTIVATION_THRESHOLD {
            self.cascade_active = false;
            self.severity = 0.0;
            self.start_month = None;
            return true;
        }
        false
    }

    /// Monthly cascade mortality rate while active
    pub fn mortality_rate(&self) -> f64 {
        self.mortality_scale * self.severity * self.severity
    }

    /// Full monthly update: aggregate, reverse-or-evolve, trigger, and
    /// route cascade mortality through the ledger funnel.
    pub fn update_risk_model(
        &mut self,
        month: Month,
        rng: &mut ChaCha8Rng,
        sink: &mut dyn MortalitySink,
    ) -> Vec<EventType> {
        let mut events = Vec::new();
        self.compute_risk();

        if self.cascade_active {
            let months_active = self.months_active(month);
            if self.maybe_reverse() {
                events.push(EventType::CascadeReversed { system: self.system, months_active });
                return events;
            }
            self.update_severity(month, rng);
            if let Some(outcome) = self.apply_mortality(sink) {
                if outcome.rejected {
                    events.push(EventType::CrisisInputRejected {
                        reason: format!("{} cascade", self.system),
                        mortality_rate: self.mortality_rate().min(1.0),
                        exposed_fraction: 1.0,
                    });
                } else {
                    events.push(EventType::CrisisDeaths {
                        category: DeathCategory::Cascade,
                        reason: format!("{} cascade", self.system),
                        requested: outcome.requested,
                        applied: outcome.applied,
                        capped: outcome.capped,
                    });
                }
            }
        } else if self.maybe_trigger(month, rng) {
            events.push(EventType::CascadeTriggered { system: self.system, risk: self.risk });
        }

        events
    }

    fn apply_mortality(&self, sink: &mut dyn MortalitySink) -> Option<CrisisOutcome> {
        let rate = self.mortality_rate();
        if rate <= 0.0 {
            return None;
        }
        let reason = format!("{} cascade", self.system);
        let outcome = sink.add_crisis_deaths_attributed(
            rate.min(1.0),
            &reason,
            1.0,
            DeathCategory::Cascade,
            &self.cause_mix,
        );
        Some(outcome)
    }
}
