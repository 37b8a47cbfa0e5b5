//! Drops a ball and prints its trajectory.
//!
//! # Usage
//!
//! ```text
//! cargo run --example bouncing_ball
//! cargo run --example bouncing_ball -- batch 0.005
//! RUST_LOG=shuttle_driver=debug cargo run --example bouncing_ball -- incremental
//! ```
//!
//! # Modes
//!
//! - **batch [h]** — Runs 3 seconds in one call and prints a summary plus every
//!   tenth sample of the height series. Defaults to `h = 0.01`.
//!
//! - **incremental [h]** — Pulls one step at a time and prints the height
//!   whenever the bounce count changes.

use std::error::Error;

use shuttle_driver::{DriveMode, Experiment, Pull, Run, simulate};
use shuttle_models::{BouncingBallBinding, EVENTS};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "batch".into());
    let step_size = std::env::args()
        .nth(2)
        .as_deref()
        .map(str::parse::<f64>)
        .transpose()?
        .unwrap_or(0.01);

    let mode = match mode.as_str() {
        "batch" => DriveMode::Batch,
        "incremental" => DriveMode::Incremental,
        other => {
            eprintln!("Unknown mode `{other}`; expected `batch` or `incremental`");
            std::process::exit(1);
        }
    };

    let binding = BouncingBallBinding::default();
    let experiment = Experiment::new(0.0, 3.0, step_size)?
        .with_instance_name("ball")
        .with_logging([EVENTS]);

    match simulate(&binding, &experiment, binding.directory(), mode)? {
        Run::Batch(summary) => {
            tracing::info!(
                steps = summary.steps,
                state_events = summary.state_events,
                "batch run done"
            );
            let (Some(time), Some(height)) = (summary.series("time"), summary.series("h")) else {
                return Err("missing series".into());
            };
            for (t, h) in time.iter().zip(height).step_by(10) {
                println!("{t:>6.2}  {h:>8.4}");
            }
        }
        Run::Incremental(mut stepper) => {
            let bounces_slot = binding
                .directory()
                .find("bounces")
                .map(|(slot, _)| slot - 1)
                .ok_or("missing bounces variable")?;

            let mut bounces = 0.0;
            while let Pull::Value(sample) = stepper.pull()? {
                if sample.values[bounces_slot] != bounces {
                    bounces = sample.values[bounces_slot];
                    println!(
                        "step {:>4}  t={:.2}  h={:.4}  bounces={bounces}",
                        sample.step, sample.time, sample.values[0]
                    );
                }
            }
            stepper.close()?;
        }
    }

    Ok(())
}
