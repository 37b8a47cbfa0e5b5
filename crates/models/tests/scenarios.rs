//! End-to-end runs of the reference components through the driver.

use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;
use shuttle_core::{Callbacks, Status};
use shuttle_driver::{
    DriveMode, Experiment, Pull, Recording, Run, Simulation, Stepper,
    batch::{self, Status as RunStatus},
    simulate,
};
use shuttle_models::{BouncingBallBinding, EVENTS, Parameters, StairBinding};

fn experiment(stop: f64, step_size: f64) -> Experiment {
    Experiment::new(0.0, stop, step_size).expect("valid experiment")
}

#[test]
fn bouncing_ball_runs_three_hundred_steps() {
    let binding = BouncingBallBinding::default();

    let summary = batch::run_unobserved(&binding, &experiment(3.0, 0.01), binding.directory())
        .expect("ball should run");

    assert_eq!(summary.status, RunStatus::Complete);
    assert_eq!(summary.steps, 300);
    assert_eq!(summary.final_time, 3.0);
    assert_eq!(summary.time_events, 0);
    assert_eq!(summary.step_events, 0);

    let bounces = summary.series("bounces").unwrap();
    let total = bounces.last().copied().unwrap();
    assert!(total >= 3.0, "ball bounced {total} times");
    #[allow(clippy::cast_precision_loss)]
    let state_events = summary.state_events as f64;
    assert!(state_events >= total, "every bounce is a state event");
}

#[test]
fn bouncing_ball_never_goes_below_the_floor() {
    let binding = BouncingBallBinding::default();

    let summary =
        batch::run_unobserved(&binding, &experiment(3.0, 0.01), binding.directory()).unwrap();

    let heights = summary.series("h").unwrap();
    assert_eq!(heights.len(), 301);
    assert_relative_eq!(heights[0], 1.0);
    assert!(heights.iter().all(|h| *h >= 0.0));
}

#[test]
fn bouncing_ball_comes_to_rest() {
    // Explicit Euler feeds energy into small bounces, so rest needs a rebound
    // threshold well above the per-step velocity change.
    let binding = BouncingBallBinding::new(Parameters {
        min_velocity: 1.0,
        ..Parameters::default()
    });

    let summary =
        batch::run_unobserved(&binding, &experiment(3.0, 0.01), binding.directory()).unwrap();

    let heights = summary.series("h").unwrap();
    let velocities = summary.series("v").unwrap();
    let bounces = summary.series("bounces").unwrap();
    assert_eq!(heights.last().copied(), Some(0.0));
    assert_eq!(velocities.last().copied(), Some(0.0));
    let total = bounces.last().copied().unwrap();
    assert!(total >= 3.0);
    #[allow(clippy::cast_precision_loss)]
    let state_events = summary.state_events as f64;
    assert_eq!(state_events, total, "no state events once at rest");
}

#[test]
fn batch_and_incremental_agree() {
    let binding = BouncingBallBinding::default();
    let experiment = experiment(3.0, 0.01);

    let summary = batch::run_unobserved(&binding, &experiment, binding.directory()).unwrap();

    let Run::Incremental(mut stepper) = simulate(
        &binding,
        &experiment,
        binding.directory(),
        DriveMode::Incremental,
    )
    .unwrap() else {
        panic!("expected a stepper");
    };

    let time = summary.series("time").unwrap();
    let heights = summary.series("h").unwrap();
    let mut pulled = 0;
    while let Pull::Value(sample) = stepper.pull().unwrap() {
        pulled += 1;
        assert_eq!(sample.step, pulled);
        assert_eq!(sample.time, time[sample.step]);
        // values[0] is `h`, the first tracked slot.
        assert_eq!(sample.values[0], heights[sample.step]);
    }
    assert_eq!(pulled, summary.steps);
    let simulation = stepper.simulation();
    assert_eq!(simulation.time(), summary.final_time);
    let counters = simulation.counters();
    assert_eq!(counters.steps, summary.steps);
    assert_eq!(counters.time_events, summary.time_events);
    assert_eq!(counters.state_events, summary.state_events);
    assert_eq!(counters.step_events, summary.step_events);
    stepper.close().unwrap();
}

#[test]
fn stair_counts_time_events() {
    let binding = StairBinding::new(1.0);
    let experiment = experiment(3.5, 0.3);

    let summary = batch::run_unobserved(&binding, &experiment, binding.directory()).unwrap();

    assert_eq!(summary.steps, 14);
    assert_eq!(summary.time_events, 3);
    assert_eq!(summary.state_events, 0);
    assert_eq!(summary.series("counter").unwrap().last().copied(), Some(3.0));
    assert_eq!(summary.final_time, 3.5);
}

#[test]
fn stair_batch_and_incremental_agree() {
    let binding = StairBinding::new(1.0);
    let experiment = experiment(3.5, 0.3);

    let summary = batch::run_unobserved(&binding, &experiment, binding.directory()).unwrap();
    let mut stepper = Stepper::start(&binding, &experiment, binding.directory()).unwrap();
    let counters: Vec<f64> = stepper
        .by_ref()
        .map(|sample| sample.map(|sample| sample.values[0]))
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(counters, summary.series("counter").unwrap()[1..]);
    let simulation = stepper.simulation();
    assert_eq!(simulation.time(), summary.final_time);
    assert_eq!(simulation.counters().steps, summary.steps);
    assert_eq!(simulation.counters().time_events, summary.time_events);
    assert_eq!(simulation.counters().step_events, summary.step_events);
    stepper.close().unwrap();
}

#[test]
fn stair_limit_terminates_early() {
    let binding = StairBinding::new(0.5).with_limit(2);

    let summary =
        batch::run_unobserved(&binding, &experiment(10.0, 0.1), binding.directory()).unwrap();

    assert_eq!(summary.status, RunStatus::Terminated);
    assert!(summary.terminated);
    assert_relative_eq!(summary.final_time, 1.0);
    assert_eq!(summary.time_events, 2);
}

#[test]
fn stair_stepper_finishes_with_done() {
    let binding = StairBinding::new(1.0).with_limit(1);
    let mut stepper =
        Stepper::start(&binding, &experiment(5.0, 0.25), binding.directory()).unwrap();

    let mut last = None;
    let done = loop {
        match stepper.pull().unwrap() {
            Pull::Value(sample) => last = Some(sample),
            done @ Pull::Done => break done,
        }
    };

    assert_eq!(done.status(), Status::Discard);
    assert_eq!(last.map(|sample| sample.time), Some(0.75));
    assert!(stepper.simulation().is_terminated());
}

#[test]
fn component_messages_reach_the_logger() {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    let callbacks = Callbacks::default().with_logger(
        move |instance: &str, status: Status, category: &str, message: &str| {
            sink.lock()
                .unwrap()
                .push(format!("[{instance}] {status} {category}: {message}"));
        },
    );
    let binding = BouncingBallBinding::default();
    let experiment = experiment(1.0, 0.01)
        .with_instance_name("ball")
        .with_logging([EVENTS]);

    let mut simulation = Simulation::initialize_with(
        &binding,
        &experiment,
        binding.directory(),
        Recording::Latest,
        callbacks,
    )
    .unwrap();
    while simulation.step().unwrap().status() == Status::Ok {}
    simulation.teardown().unwrap();

    let lines = lines.lock().unwrap();
    assert!(lines.iter().any(|line| line.starts_with("[ball] OK events: bounce 1")));
}

#[test]
fn bad_parameters_fail_initialization() {
    let binding = BouncingBallBinding::new(Parameters {
        gravity: -1.0,
        ..Parameters::default()
    });

    let err = batch::run_unobserved(&binding, &experiment(1.0, 0.01), binding.directory())
        .expect_err("negative gravity");

    assert_eq!(err.status(), Status::Error);
}
