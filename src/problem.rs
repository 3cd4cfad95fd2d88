use core::fmt;
use std::{f64::consts::PI, rc::Rc};

use crate::Float;

/// A heat equation `u_t = u_xx` on `[a, b]` with Dirichlet boundary conditions.
pub trait ProblemSpec {
    fn name(&self) -> &str;

    /// Endpoints `(a, b)` with `a < b`.
    fn domain(&self) -> (Float, Float);

    fn initial(&self, x: Float) -> Float;

    fn boundary_left(&self, t: Float) -> Float;

    fn boundary_right(&self, t: Float) -> Float;

    /// Closed-form solution, if known. Used only to report errors.
    #[allow(unused_variables)]
    fn exact(&self, x: Float, t: Float) -> Option<Float> {
        None
    }
}

/// `u(x, t) = exp(-π²t/4) cos(πx/2)` on `[-1, 1]`
#[derive(Debug, Clone, Copy, Default)]
pub struct Heat1;

impl Heat1 {
    fn solution(x: Float, t: Float) -> Float {
        (-PI * PI / 4.0 * t).exp() * (PI / 2.0 * x).cos()
    }
}

impl ProblemSpec for Heat1 {
    fn name(&self) -> &str {
        "heat1"
    }

    fn domain(&self) -> (Float, Float) {
        (-1.0, 1.0)
    }

    fn initial(&self, x: Float) -> Float {
        Self::solution(x, 0.0)
    }

    fn boundary_left(&self, t: Float) -> Float {
        Self::solution(-1.0, t)
    }

    fn boundary_right(&self, t: Float) -> Float {
        Self::solution(1.0, t)
    }

    fn exact(&self, x: Float, t: Float) -> Option<Float> {
        Some(Self::solution(x, t))
    }
}

/// Rectangular bump `u₀(x) = 1` for `|x| < 0.4`, `0` elsewhere, held at zero on
/// both ends of `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RectangularBump;

impl ProblemSpec for RectangularBump {
    fn name(&self) -> &str {
        "rectangular bump"
    }

    fn domain(&self) -> (Float, Float) {
        (-1.0, 1.0)
    }

    fn initial(&self, x: Float) -> Float {
        if x.abs() < 0.4 {
            1.0
        } else {
            0.0
        }
    }

    fn boundary_left(&self, _t: Float) -> Float {
        0.0
    }

    fn boundary_right(&self, _t: Float) -> Float {
        0.0
    }
}

/// Built-in problems, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    Heat1,
    RectangularBump,
}

impl ProblemKind {
    pub fn build(self) -> Rc<dyn ProblemSpec> {
        match self {
            ProblemKind::Heat1 => Rc::new(Heat1),
            ProblemKind::RectangularBump => Rc::new(RectangularBump),
        }
    }
}

pub trait InitialCondition: Fn(Float) -> Float {}
impl<T> InitialCondition for T where T: Fn(Float) -> Float {}

pub trait BoundaryCondition: Fn(Float) -> Float {}
impl<T> BoundaryCondition for T where T: Fn(Float) -> Float {}

pub trait ExactSolution: Fn(Float, Float) -> Float {}
impl<T> ExactSolution for T where T: Fn(Float, Float) -> Float {}

/// A problem assembled from closures.
#[derive(Clone)]
pub struct Problem<'pb> {
    pub(crate) name: String,
    pub(crate) domain: (Float, Float),
    pub(crate) u0: Rc<dyn InitialCondition + 'pb>,
    pub(crate) left: Rc<dyn BoundaryCondition + 'pb>,
    pub(crate) right: Rc<dyn BoundaryCondition + 'pb>,
    pub(crate) exact: Option<Rc<dyn ExactSolution + 'pb>>,
}

impl<'pb> Problem<'pb> {
    pub fn new(
        name: impl AsRef<str>,
        domain: (Float, Float),
        u0: impl InitialCondition + 'pb,
        left: impl BoundaryCondition + 'pb,
        right: impl BoundaryCondition + 'pb,
    ) -> Self {
        Self {
            name: name.as_ref().to_string(),
            domain,
            u0: Rc::new(u0),
            left: Rc::new(left),
            right: Rc::new(right),
            exact: None,
        }
    }

    pub fn with_exact(mut self, exact: impl ExactSolution + 'pb) -> Self {
        self.exact = Some(Rc::new(exact));
        self
    }
}

impl ProblemSpec for Problem<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> (Float, Float) {
        self.domain
    }

    fn initial(&self, x: Float) -> Float {
        (self.u0)(x)
    }

    fn boundary_left(&self, t: Float) -> Float {
        (self.left)(t)
    }

    fn boundary_right(&self, t: Float) -> Float {
        (self.right)(t)
    }

    fn exact(&self, x: Float, t: Float) -> Option<Float> {
        self.exact.as_ref().map(|exact| exact(x, t))
    }
}

impl fmt::Debug for Problem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("u0", &"<dyn InitialCondition>")
            .field("left", &"<dyn BoundaryCondition>")
            .field("right", &"<dyn BoundaryCondition>")
            .field("exact", &self.exact.as_ref().map(|_| "<dyn ExactSolution>"))
            .finish()
    }
}
