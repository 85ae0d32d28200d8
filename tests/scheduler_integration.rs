//! Integration tests for the phase scheduler
//!
//! These verify the ordering contract, duplicate-id rejection, phase
//! failure isolation, and the month-end observer.

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use worldline::core::error::{Result, WorldlineError};
use worldline::scheduler::events::{EventType, RunLog};
use worldline::scheduler::{Phase, PhaseContext, PhaseResult, RunOptions, Scheduler};
use worldline::state::SimulationState;

/// Records its own execution into a shared trace
struct TracePhase {
    id: &'static str,
    order: f64,
    trace: Rc<RefCell<Vec<&'static str>>>,
}

impl Phase for TracePhase {
    fn id(&self) -> &'static str {
        self.id
    }

    fn order(&self) -> f64 {
        self.order
    }

    fn execute(
        &mut self,
        _state: &mut SimulationState,
        _rng: &mut ChaCha8Rng,
        _ctx: &PhaseContext,
    ) -> Result<PhaseResult> {
        self.trace.borrow_mut().push(self.id);
        Ok(PhaseResult::empty())
    }
}

struct FailingPhase {
    order: f64,
}

impl Phase for FailingPhase {
    fn id(&self) -> &'static str {
        "failing"
    }

    fn order(&self) -> f64 {
        self.order
    }

    fn execute(
        &mut self,
        _state: &mut SimulationState,
        _rng: &mut ChaCha8Rng,
        _ctx: &PhaseContext,
    ) -> Result<PhaseResult> {
        Err(WorldlineError::PhaseExecution("simulated phase failure".into()))
    }
}

fn trace_phase(
    id: &'static str,
    order: f64,
    trace: &Rc<RefCell<Vec<&'static str>>>,
) -> Box<TracePhase> {
    Box::new(TracePhase { id, order, trace: Rc::clone(trace) })
}

#[test]
fn test_phases_execute_in_ascending_order() {
    let trace = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = Scheduler::new();
    // Deliberately registered out of order.
    scheduler.register(trace_phase("seven", 7.0, &trace)).unwrap();
    scheduler.register(trace_phase("point-four", 0.4, &trace)).unwrap();
    scheduler.register(trace_phase("twenty", 20.5, &trace)).unwrap();
    scheduler.register(trace_phase("two-five", 2.5, &trace)).unwrap();

    let mut state = SimulationState::default();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut log = RunLog::new();
    scheduler.step(&mut state, &mut rng, &mut log);

    assert_eq!(
        *trace.borrow(),
        vec!["point-four", "two-five", "seven", "twenty"]
    );
    assert_eq!(state.month, 1);
}

#[test]
fn test_equal_orders_run_in_registration_order() {
    let trace = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = Scheduler::new();
    scheduler.register(trace_phase("first", 1.0, &trace)).unwrap();
    scheduler.register(trace_phase("second", 1.0, &trace)).unwrap();
    scheduler.register(trace_phase("third", 1.0, &trace)).unwrap();

    let mut state = SimulationState::default();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut log = RunLog::new();
    scheduler.step(&mut state, &mut rng, &mut log);

    assert_eq!(*trace.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_duplicate_phase_id_rejected() {
    let trace = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = Scheduler::new();
    scheduler.register(trace_phase("dup", 1.0, &trace)).unwrap();

    let err = scheduler.register(trace_phase("dup", 2.0, &trace)).unwrap_err();
    assert!(matches!(err, WorldlineError::DuplicatePhaseId(id) if id == "dup"));
    assert_eq!(scheduler.phase_count(), 1);
}

#[test]
fn test_nan_order_rejected() {
    let trace = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = Scheduler::new();
    let err = scheduler.register(trace_phase("nan", f64::NAN, &trace)).unwrap_err();
    assert!(matches!(err, WorldlineError::InvalidPhaseOrder { .. }));
}

#[test]
fn test_phase_failure_is_isolated() {
    let trace = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = Scheduler::new();
    scheduler.register(trace_phase("before", 1.0, &trace)).unwrap();
    scheduler.register(Box::new(FailingPhase { order: 2.0 })).unwrap();
    scheduler.register(trace_phase("after", 3.0, &trace)).unwrap();

    let mut state = SimulationState::default();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut log = RunLog::new();
    scheduler.step(&mut state, &mut rng, &mut log);

    // The failing phase did not stop the month.
    assert_eq!(*trace.borrow(), vec!["before", "after"]);
    assert_eq!(state.month, 1);

    // And the failure is on the record, filed under the month it happened.
    let failure = log
        .events_for_month(0)
        .find(|e| matches!(&e.event_type, EventType::PhaseFailed { .. }))
        .expect("failure event must be logged");
    match &failure.event_type {
        EventType::PhaseFailed { phase_id, error } => {
            assert_eq!(phase_id, "failing");
            assert!(error.contains("simulated phase failure"));
        }
        _ => unreachable!(),
    }
    assert_eq!(log.events_for_month(1).count(), 0);
}

#[test]
fn test_failing_phase_logged_every_month() {
    let mut scheduler = Scheduler::new();
    scheduler.register(Box::new(FailingPhase { order: 1.0 })).unwrap();

    let state = SimulationState::default();
    let rng = ChaCha8Rng::seed_from_u64(0);
    let outcome = scheduler.run(state, rng, RunOptions::months(5)).unwrap();

    let failures = outcome
        .log
        .events
        .iter()
        .filter(|e| matches!(e.event_type, EventType::PhaseFailed { .. }))
        .count();
    assert_eq!(failures, 5, "a persistently failing phase surfaces every month");
}

#[test]
fn test_on_month_end_observer_sees_every_month() {
    let trace = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = Scheduler::new();
    scheduler.register(trace_phase("only", 1.0, &trace)).unwrap();

    let months_seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&months_seen);
    let opts = RunOptions {
        max_months: 4,
        stop_at_lock_in: true,
        on_month_end: Some(Box::new(move |state: &SimulationState| {
            sink.borrow_mut().push(state.month);
        })),
    };

    let state = SimulationState::default();
    let rng = ChaCha8Rng::seed_from_u64(0);
    let outcome = scheduler.run(state, rng, opts).unwrap();

    assert_eq!(outcome.months_run, 4);
    assert_eq!(*months_seen.borrow(), vec![1, 2, 3, 4]);
}

#[test]
fn test_structural_error_is_fatal() {
    let mut scheduler = Scheduler::new();
    let mut state = SimulationState::default();
    state.ledger.population = f64::NAN;

    let rng = ChaCha8Rng::seed_from_u64(0);
    let err = scheduler.run(state, rng, RunOptions::months(1)).unwrap_err();
    assert!(matches!(err, WorldlineError::Structural(_)));
}
