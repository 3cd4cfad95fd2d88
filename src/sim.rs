use std::{fmt, rc::Rc};

use crate::{
    driver::SimError,
    implicit::PivotGuard,
    mesh::{Grid, Mesh},
    problem::ProblemSpec,
    Float,
};

/// A validated run: problem, mesh and solver options.
#[derive(Clone)]
pub struct Simulation<'pb> {
    pub(crate) problem: Rc<dyn ProblemSpec + 'pb>,
    pub(crate) mesh: Mesh,
    pub(crate) guard: PivotGuard,
}

fn invalid(name: &'static str, reason: impl Into<String>) -> SimError {
    SimError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

impl<'pb> Simulation<'pb> {
    /// Marches `problem` up to `final_time` with `interior` unknowns in space and
    /// `steps` time steps.
    pub fn new(
        problem: impl ProblemSpec + 'pb,
        final_time: Float,
        interior: usize,
        steps: usize,
    ) -> Result<Self, SimError> {
        Self::from_shared(Rc::new(problem), final_time, interior, steps)
    }

    pub fn from_shared(
        problem: Rc<dyn ProblemSpec + 'pb>,
        final_time: Float,
        interior: usize,
        steps: usize,
    ) -> Result<Self, SimError> {
        if !(final_time.is_finite() && final_time > 0.0) {
            return Err(invalid("T", format!("{final_time} is not a positive time")));
        }
        if interior < 1 {
            return Err(invalid("n", "at least one interior point is needed"));
        }
        if interior.checked_add(2).is_none() {
            return Err(invalid("n", format!("{interior} points cannot be stored")));
        }
        if steps.checked_add(1).is_none() {
            return Err(invalid("steps", format!("{steps} steps cannot be stored")));
        }

        let (lower, upper) = problem.domain();
        if !(lower.is_finite() && upper.is_finite() && lower < upper) {
            return Err(invalid(
                "domain",
                format!("[{lower}, {upper}] is not a bounded interval"),
            ));
        }

        let mesh = Mesh::new(
            Grid::from_steps(0.0, final_time, steps),
            Grid::from_steps(lower, upper, interior + 1),
        );

        tracing::debug!(
            problem = problem.name(),
            final_time,
            interior,
            steps,
            "simulation configured"
        );

        Ok(Self {
            problem,
            mesh,
            guard: PivotGuard::default(),
        })
    }

    pub fn with_pivot_guard(mut self, guard: PivotGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn problem(&self) -> &dyn ProblemSpec {
        self.problem.as_ref()
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}

impl fmt::Display for Simulation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "simulation of `{}` problem:\n\t- backward Euler\n\t- Δx = {:e} ({} interior points)\n\t- Δt = {:e} ({} steps)\n\t- r = {:e}",
            self.problem.name(),
            self.mesh.space.delta,
            self.mesh.interior_points(),
            self.mesh.time.delta,
            self.mesh.time.steps,
            self.mesh.ratio(),
        )
    }
}

impl fmt::Debug for Simulation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("problem", &self.problem.name())
            .field("mesh", &self.mesh)
            .field("guard", &self.guard)
            .finish()
    }
}
