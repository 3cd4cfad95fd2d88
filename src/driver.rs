use std::fmt;

use faer_core::{Mat, MatRef};
use thiserror::Error;

use crate::{
    implicit::BackwardEuler, mesh::Mesh, problem::ProblemSpec, sim::Simulation,
    tridiagonal::SolveError, Float,
};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("output error")]
    Io(#[from] std::io::Error),
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("numerical failure at step {step}")]
    Numerical {
        step: usize,
        #[source]
        source: SolveError,
    },
}

#[derive(Clone, Copy)]
pub struct ObsCtx<'ctx> {
    // Meta
    problem: &'ctx dyn ProblemSpec,
    mesh: &'ctx Mesh,
    ratio: Float,

    // Iteration info
    iter: usize,
    time: Float,
    solution: MatRef<'ctx, Float>, // current solution, boundary points included
}

impl<'ctx> ObsCtx<'ctx> {
    pub fn problem(&self) -> &'ctx dyn ProblemSpec {
        self.problem
    }

    pub fn mesh(&self) -> &'ctx Mesh {
        self.mesh
    }

    pub fn ratio(&self) -> Float {
        self.ratio
    }

    pub fn iter(&self) -> usize {
        self.iter
    }

    pub fn time(&self) -> Float {
        self.time
    }

    pub fn solution(&self) -> MatRef<'ctx, Float> {
        self.solution
    }
}

/// Hooks called by [`Driver::run`], in step order.
#[allow(unused_variables)]
pub trait Observer {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), SimError> {
        Ok(())
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx) -> Result<(), SimError> {
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx) -> Result<(), SimError> {
        Ok(())
    }
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), SimError> {
        (**self).at_startup(ctx)
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx) -> Result<(), SimError> {
        (**self).at_each_iteration(ctx)
    }

    fn at_cleanup(&mut self, ctx: ObsCtx) -> Result<(), SimError> {
        (**self).at_cleanup(ctx)
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub lower: Float,
    pub upper: Float,
    pub final_time: Float,
    pub dx: Float,
    pub dt: Float,
    pub ratio: Float,
    /// L∞ error at the final time, when the problem has an exact solution.
    pub max_error: Option<Float>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} < x < {}, 0 < t < {}, dx = {:e}, dt = {:e}, r = dt/dx² = {:e}",
            self.lower, self.upper, self.final_time, self.dx, self.dt, self.ratio
        )?;
        if let Some(err) = self.max_error {
            write!(f, "\nmax error at t = {}: {:e}", self.final_time, err)?;
        }
        Ok(())
    }
}

pub struct Driver<'pb, 'd> {
    pub(crate) sim: Simulation<'pb>,
    pub(crate) observers: Vec<Box<dyn Observer + 'd>>,
}

impl<'pb, 'd> Driver<'pb, 'd> {
    pub fn new(sim: Simulation<'pb>) -> Self {
        Self {
            sim,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: impl Observer + 'd) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn run(&mut self) -> Result<Report, SimError> {
        let Simulation {
            problem,
            mesh,
            guard,
        } = &self.sim;
        let problem = problem.as_ref();

        let mut engine = BackwardEuler::init(problem, mesh, *guard);
        let ratio = engine.ratio();

        for o in self.observers.iter_mut() {
            o.at_startup(ObsCtx {
                problem,
                mesh,
                ratio,
                iter: 0,
                time: mesh.time.lower,
                solution: engine.current(),
            })?;
        }

        // propagate solution
        for (k, t) in mesh.time.iter().enumerate().skip(1) {
            engine
                .step(problem, t)
                .map_err(|source| SimError::Numerical { step: k, source })?;

            for o in self.observers.iter_mut() {
                o.at_each_iteration(ObsCtx {
                    problem,
                    mesh,
                    ratio,
                    iter: k,
                    time: t,
                    solution: engine.current(),
                })?;
            }
        }

        for o in self.observers.iter_mut() {
            o.at_cleanup(ObsCtx {
                problem,
                mesh,
                ratio,
                iter: mesh.time.steps,
                time: mesh.time.upper,
                solution: engine.current(),
            })?;
        }

        let (lower, upper) = problem.domain();
        let report = Report {
            lower,
            upper,
            final_time: mesh.time.upper,
            dx: mesh.space.delta,
            dt: mesh.time.delta,
            ratio,
            max_error: engine.max_error(problem, mesh.space, mesh.time.upper),
        };

        if let Some(err) = report.max_error {
            tracing::info!("max error at t = {}: {:e}", report.final_time, err);
        }

        Ok(report)
    }
}

/// Logs the progress of a run through `tracing`.
pub struct Logger {
    period: usize,
}

impl Logger {
    pub fn new() -> Self {
        Self { period: 1 }
    }

    /// Only log one step out of `period`.
    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period.max(1);
        self
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for Logger {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), SimError> {
        tracing::event!(
            tracing::Level::INFO,
            "start of simulation of problem `{}` (backward Euler, Δx={:e} ({} interior points), Δt={:e} ({} steps), r={:e})",
            ctx.problem().name(),
            ctx.mesh().space.delta,
            ctx.mesh().interior_points(),
            ctx.mesh().time.delta,
            ctx.mesh().time.steps,
            ctx.ratio(),
        );
        Ok(())
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx) -> Result<(), SimError> {
        if ctx.iter() % self.period == 0 {
            tracing::event!(
                tracing::Level::TRACE,
                "problem `{}`: step {} (t={:e})",
                ctx.problem().name(),
                ctx.iter(),
                ctx.time()
            );
        }
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx) -> Result<(), SimError> {
        tracing::event!(
            tracing::Level::INFO,
            "finished simulation of problem `{}`",
            ctx.problem().name()
        );
        Ok(())
    }
}

/// Keeps every step of the solution, column `k` holding step `k`.
pub struct InMemory {
    solution: Mat<Float>,
}

impl InMemory {
    pub fn new() -> Self {
        Self {
            solution: Mat::zeros(0, 0),
        }
    }

    pub fn solution(&self) -> MatRef<'_, Float> {
        self.solution.as_ref()
    }
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for InMemory {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), SimError> {
        self.solution = Mat::zeros(ctx.mesh().space.steps + 1, ctx.mesh().time.steps + 1);
        self.at_each_iteration(ctx)
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx) -> Result<(), SimError> {
        self.solution
            .as_mut()
            .col(ctx.iter())
            .clone_from(ctx.solution());
        Ok(())
    }
}
