//! Events and run logging
//!
//! Every decision the core takes that an analyst might want to
//! reconstruct afterwards (cap hits, guards, cascade flips, escalation
//! attempts) is recorded here. The run log is append-only and is the
//! only persisted artifact of a run.

use serde::{Deserialize, Serialize};

use crate::breaker::LayerKind;
use crate::core::types::{CascadeSystem, DeathCategory, Month};

/// A single logged event
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    pub month: Month,
    pub event_type: EventType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventType {
    // Cascades
    CascadeTriggered { system: CascadeSystem, risk: f64 },
    CascadeReversed { system: CascadeSystem, months_active: u32 },
    SignalBreached { system: CascadeSystem, signal: String },

    // Mortality ledger
    CrisisDeaths {
        category: DeathCategory,
        reason: String,
        requested: f64,
        applied: f64,
        capped: bool,
    },
    CrisisInputRejected {
        reason: String,
        mortality_rate: f64,
        exposed_fraction: f64,
    },
    DeathCapReached { month_start_population: f64 },
    OvershootDieOff { requested: f64, applied: f64 },
    ArithmeticGuard { component: String },
    PopulationBottleneck { population: f64 },
    Extinction { population: f64 },

    // Deterrence
    EscalationAttempt {
        blocked: bool,
        blocking_layer: Option<LayerKind>,
        attacker_capability: f64,
    },
    EscalationSucceeded { deaths: f64 },

    // Scheduler
    PhaseFailed { phase_id: String, error: String },
}

/// The complete append-only run log
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunLog {
    pub events: Vec<Event>,
    next_event_id: u32,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&mut self, event_type: EventType, month: Month) -> u32 {
        let id = self.next_event_id;
        self.next_event_id += 1;
        self.events.push(Event { id, month, event_type });
        id
    }

    pub fn events_for_month(&self, month: Month) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.month == month)
    }

    /// Whether any event in the log matches the predicate
    pub fn contains(&self, mut pred: impl FnMut(&EventType) -> bool) -> bool {
        self.events.iter().any(|e| pred(&e.event_type))
    }
}
