//! Error of the backward Euler scheme on `heat1` as the time step shrinks.
//!
//! Run with `RUST_LOG=info cargo run --example convergence`.

use tracing::info;

use heat_implicit::{problem::Heat1, Driver, Float, Simulation};

fn main() -> Result<(), heat_implicit::SimError> {
    tracing_subscriber::fmt::init();

    let final_time = 0.5;
    let interior = 199;

    info!(final_time, interior, "refining the time step");

    println!("{:>8} {:>12} {:>12} {:>8}", "steps", "dt", "max error", "ratio");
    let mut previous: Option<Float> = None;
    for steps in [10, 20, 40, 80, 160, 320] {
        let sim = Simulation::new(Heat1, final_time, interior, steps)?;
        let report = Driver::new(sim).run()?;
        let error = report.max_error.unwrap_or(Float::NAN);

        let ratio = previous.map_or(String::new(), |p| format!("{:.3}", p / error));
        println!("{steps:>8} {:>12.3e} {error:>12.3e} {ratio:>8}", report.dt);
        previous = Some(error);
    }

    info!("done");
    Ok(())
}
