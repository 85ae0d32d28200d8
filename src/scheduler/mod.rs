//! Phase scheduler - drives one month of simulation at a time
//!
//! All per-month update logic is packaged as [`Phase`] implementations
//! with a fractional `order`. The scheduler sorts phases by `order`
//! (stable, so equal orders run in registration order), hands each one
//! exclusive access to the state tree and the run's RNG stream, and
//! collects every event they return. A phase that fails is logged and
//! skipped; the month continues with the next phase.

pub mod events;

use ahash::AHashSet;
use ordered_float::NotNan;
use rand_chacha::ChaCha8Rng;

use crate::core::error::{Result, WorldlineError};
use crate::core::types::Month;
use crate::ledger::EXTINCTION_THRESHOLD;
use crate::state::SimulationState;
use events::{EventType, RunLog};

/// A unit of per-month update logic
///
/// Phases receive the RNG stream explicitly. There is no ambient
/// random source anywhere in the crate; forgetting to thread the RNG
/// is a compile error, not a silent determinism break.
pub trait Phase {
    /// Unique id within one scheduler instance
    fn id(&self) -> &'static str;

    /// Human-readable name for diagnostics
    fn name(&self) -> &'static str {
        self.id()
    }

    /// Execution priority: lower runs first, fractional values allowed
    fn order(&self) -> f64;

    fn execute(
        &mut self,
        state: &mut SimulationState,
        rng: &mut ChaCha8Rng,
        ctx: &PhaseContext,
    ) -> Result<PhaseResult>;
}

/// Per-invocation context handed to every phase
#[derive(Debug, Clone, Copy)]
pub struct PhaseContext {
    pub month: Month,
}

/// What a phase produced this month
#[derive(Debug, Default)]
pub struct PhaseResult {
    pub events: Vec<EventType>,
    pub logs: Vec<String>,
}

impl PhaseResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<EventType>) -> Self {
        Self { events, logs: Vec::new() }
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Termination {
    /// Ran to `max_months`
    Completed,
    /// Population fell below the extinction threshold
    Extinct { month: Month },
    /// A terminal outcome (nuclear exchange) locked in
    LockedIn { month: Month },
}

/// Options for [`Scheduler::run`]
pub struct RunOptions {
    pub max_months: u32,
    /// Stop early once a terminal outcome has locked in. Clear it to
    /// keep the run alive and observe the post-exchange trajectory.
    pub stop_at_lock_in: bool,
    /// Observer invoked after each completed month
    pub on_month_end: Option<Box<dyn FnMut(&SimulationState)>>,
}

impl RunOptions {
    pub fn months(max_months: u32) -> Self {
        Self { max_months, stop_at_lock_in: true, on_month_end: None }
    }
}

/// Result of a completed run
#[derive(Debug)]
pub struct RunOutcome {
    pub final_state: SimulationState,
    pub log: RunLog,
    pub months_run: u32,
    pub termination: Termination,
}

struct Entry {
    order: NotNan<f64>,
    phase: Box<dyn Phase>,
}

/// Ordered phase registry and monthly driver
#[derive(Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
    ids: AHashSet<&'static str>,
    sorted: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a phase. Fails on duplicate id or non-finite order.
    pub fn register(&mut self, phase: Box<dyn Phase>) -> Result<()> {
        let id = phase.id();
        let order = NotNan::new(phase.order()).map_err(|_| WorldlineError::InvalidPhaseOrder {
            id: id.to_string(),
            order: phase.order(),
        })?;
        if !self.ids.insert(id) {
            return Err(WorldlineError::DuplicatePhaseId(id.to_string()));
        }
        self.entries.push(Entry { order, phase });
        self.sorted = false;
        Ok(())
    }

    pub fn phase_count(&self) -> usize {
        self.entries.len()
    }

    /// Advance the simulation by exactly one month.
    ///
    /// Resets the ledger's monthly counters (snapshotting the
    /// month-start population the death cap is computed from), runs
    /// every phase in ascending order, and bumps the clock. Events are
    /// appended to `log` stamped with the month they occurred in.
    pub fn step(&mut self, state: &mut SimulationState, rng: &mut ChaCha8Rng, log: &mut RunLog) {
        if !self.sorted {
            // Stable: equal orders keep registration order.
            self.entries.sort_by_key(|e| e.order);
            self.sorted = true;
        }

        let month = state.month;
        state.ledger.begin_month();
        let ctx = PhaseContext { month };

        for entry in &mut self.entries {
            match entry.phase.execute(state, rng, &ctx) {
                Ok(result) => {
                    for event in result.events {
                        log.add_event(event, month);
                    }
                    for line in result.logs {
                        tracing::debug!(phase = entry.phase.id(), month, "{line}");
                    }
                }
                Err(err) => {
                    // Failure isolation: one bad phase must not abort a
                    // multi-thousand-run sweep.
                    tracing::warn!(
                        phase = entry.phase.id(),
                        month,
                        error = %err,
                        "phase failed, continuing with next phase"
                    );
                    log.add_event(
                        EventType::PhaseFailed {
                            phase_id: entry.phase.id().to_string(),
                            error: err.to_string(),
                        },
                        month,
                    );
                }
            }
        }

        state.month += 1;
    }

    /// Run the full simulation loop.
    ///
    /// Stops at `max_months`, early when the population falls below
    /// the extinction threshold, or early when a terminal outcome has
    /// locked in. Structural problems with the initial state are fatal;
    /// nothing useful can be recovered from a run that never had a
    /// valid ledger.
    pub fn run(
        &mut self,
        mut state: SimulationState,
        mut rng: ChaCha8Rng,
        mut opts: RunOptions,
    ) -> Result<RunOutcome> {
        state.validate()?;

        let mut log = RunLog::new();
        let mut termination = Termination::Completed;
        let mut months_run = 0;

        for _ in 0..opts.max_months {
            let month = state.month;
            self.step(&mut state, &mut rng, &mut log);
            months_run += 1;

            if state.ledger.population < EXTINCTION_THRESHOLD {
                log.add_event(
                    EventType::Extinction { population: state.ledger.population },
                    month,
                );
                termination = Termination::Extinct { month };
            } else if opts.stop_at_lock_in && state.deterrence.escalation_occurred {
                termination = Termination::LockedIn { month };
            }

            if let Some(observer) = opts.on_month_end.as_mut() {
                observer(&state);
            }

            if termination != Termination::Completed {
                break;
            }
        }

        Ok(RunOutcome { final_state: state, log, months_run, termination })
    }
}
