//! Backward Euler time marching for `u_t = u_xx` with Dirichlet boundaries.
//!
//! Each step solves
//!
//! ```text
//! -r U^{k+1}_{j-1} + (1 + 2r) U^{k+1}_j - r U^{k+1}_{j+1} = U^k_j,   j = 1..n
//! ```
//!
//! where `r = dt / dx²` and the boundary values `U^{k+1}_0`, `U^{k+1}_{n+1}`
//! are moved to the right-hand side.

use std::{alloc::Layout, panic::Location};

use faer_core::{Mat, MatRef};

use crate::{
    mesh::{Grid, Mesh},
    problem::ProblemSpec,
    tridiagonal::{self, SolveError},
    Float,
};

// every buffer of the engine is allocated here
#[track_caller]
pub(crate) fn column(len: usize) -> Mat<Float> {
    if Layout::array::<Float>(len).is_err() {
        let caller = Location::caller();
        tracing::error!(%caller, len, "allocation failed");
        panic!("{caller}: allocation of {len} values failed");
    }
    Mat::zeros(len, 1)
}

/// Whether pivots of the tridiagonal solve are checked.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PivotGuard {
    #[default]
    Unchecked,
    Checked { tolerance: Float },
}

pub struct BackwardEuler {
    interior: usize,
    ratio: Float,
    guard: PivotGuard,
    // solution buffers of length n + 2, `buffers[current]` is authoritative
    buffers: [Mat<Float>; 2],
    current: usize,
    // length n, consumed by every solve
    diag: Mat<Float>,
    // length n - 1, both sub and super diagonal
    off: Mat<Float>,
}

impl BackwardEuler {
    pub fn init(problem: &dyn ProblemSpec, mesh: &Mesh, guard: PivotGuard) -> Self {
        let interior = mesh.interior_points();
        assert!(interior >= 1, "the mesh needs at least one interior point");

        let ratio = mesh.ratio();
        let mut u = column(interior + 2);
        let v = column(interior + 2);

        for (j, x) in mesh.space.iter().enumerate() {
            u.write(j, 0, problem.initial(x));
        }

        let mut off = column(interior - 1);
        for i in 0..interior - 1 {
            off.write(i, 0, -ratio);
        }

        tracing::debug!(interior, ratio, ?guard, "backward euler initialized");

        Self {
            interior,
            ratio,
            guard,
            buffers: [u, v],
            current: 0,
            diag: column(interior),
            off,
        }
    }

    pub fn ratio(&self) -> Float {
        self.ratio
    }

    pub fn current(&self) -> MatRef<'_, Float> {
        self.buffers[self.current].as_ref()
    }

    /// Advances the solution to time `t`. Boundary values are staged and
    /// folded before the solve, the buffers trade roles after it.
    pub fn step(&mut self, problem: &dyn ProblemSpec, t: Float) -> Result<(), SolveError> {
        let (n, r) = (self.interior, self.ratio);

        let [a, b] = &mut self.buffers;
        let (u, v) = if self.current == 0 { (a, b) } else { (b, a) };

        v.write(0, 0, problem.boundary_left(t));
        v.write(n + 1, 0, problem.boundary_right(t));

        u.write(1, 0, u.read(1, 0) + r * v.read(0, 0));
        u.write(n, 0, u.read(n, 0) + r * v.read(n + 1, 0));

        for i in 0..n {
            self.diag.write(i, 0, 1.0 + 2.0 * r);
        }

        let rhs = u.as_mut().subrows(1, n);
        let out = v.as_mut().subrows(1, n);
        match self.guard {
            PivotGuard::Unchecked => tridiagonal::solve_to(
                self.off.as_ref(),
                self.diag.as_mut(),
                self.off.as_ref(),
                rhs,
                out,
            ),
            PivotGuard::Checked { tolerance } => tridiagonal::try_solve_to(
                self.off.as_ref(),
                self.diag.as_mut(),
                self.off.as_ref(),
                rhs,
                out,
                tolerance,
            )?,
        }

        self.current = 1 - self.current;
        Ok(())
    }

    /// `max_j |u_j - exact(x_j, t)|` over the whole grid, `None` without an
    /// exact solution. A `NaN` anywhere in the solution makes the result `NaN`.
    pub fn max_error(&self, problem: &dyn ProblemSpec, space: Grid, t: Float) -> Option<Float> {
        let u = self.current();
        let mut err: Float = 0.0;
        for (j, x) in space.iter().enumerate() {
            let diff = (u.read(j, 0) - problem.exact(x, t)?).abs();
            if diff > err || diff.is_nan() {
                err = diff;
            }
        }
        Some(err)
    }
}
