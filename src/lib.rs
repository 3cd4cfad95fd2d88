//! Implicit (backward Euler) finite differences for the heat equation
//! `u_t = u_xx` on a bounded interval with Dirichlet boundary conditions.
//!
//! ```no_run
//! use heat_implicit::{problem::Heat1, Driver, GeomviewWriter, Logger, Simulation};
//!
//! let sim = Simulation::new(Heat1, 0.5, 19, 50)?;
//! let output = std::io::BufWriter::new(std::fs::File::create("im1.gv")?);
//! let report = Driver::new(sim)
//!     .with_observer(Logger::new())
//!     .with_observer(GeomviewWriter::new(output))
//!     .run()?;
//! println!("{report}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod driver;
pub mod geomview;
pub mod implicit;
pub mod mesh;
pub mod problem;
pub mod sim;
pub mod tridiagonal;

pub type Float = f64;

pub use driver::{Driver, InMemory, Logger, ObsCtx, Observer, Report, SimError};
pub use geomview::GeomviewWriter;
pub use implicit::{BackwardEuler, PivotGuard};
pub use mesh::{Grid, Mesh};
pub use problem::{ProblemKind, ProblemSpec};
pub use sim::Simulation;
