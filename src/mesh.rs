use crate::Float;

// grid[0] <-> lower
// grid[i] <-> lower + (upper - lower) * i / steps
// grid[steps] <-> upper
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub(crate) lower: Float,
    pub(crate) upper: Float,
    pub(crate) delta: Float,
    pub(crate) steps: usize,
}

impl Grid {
    /// Uniform grid of `steps` intervals (`steps + 1` points) over `[lower, upper]`.
    ///
    /// With `steps == 0` the spacing is infinite, which is what IEEE division gives.
    pub fn from_steps(lower: Float, upper: Float, steps: usize) -> Self {
        let delta = (upper - lower) / steps as Float;
        Self {
            lower,
            upper,
            delta,
            steps,
        }
    }

    pub fn lower(&self) -> Float {
        self.lower
    }

    pub fn upper(&self) -> Float {
        self.upper
    }

    pub fn delta(&self) -> Float {
        self.delta
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Coordinate of point `i`.
    ///
    /// Computed as `lower + (upper - lower) * i / steps` rather than
    /// `lower + delta * i`, so the last point lands exactly on `upper`. On fine
    /// grids the printed coordinates and values near `upper` can therefore
    /// differ in the last digits from an accumulated `delta * i`.
    pub fn point(&self, i: usize) -> Float {
        if self.steps == 0 {
            return self.lower;
        }
        self.lower + (self.upper - self.lower) * i as Float / self.steps as Float
    }

    /// Position of point `i` normalized to `[0, 1]`.
    pub fn fraction(&self, i: usize) -> Float {
        if self.steps == 0 {
            return 0.0;
        }
        i as Float / self.steps as Float
    }

    pub fn iter(self) -> impl Iterator<Item = Float> {
        (0..(self.steps + 1)).map(move |i| self.point(i))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub(crate) time: Grid,
    pub(crate) space: Grid,
}

impl Mesh {
    pub fn new(time: Grid, space: Grid) -> Self {
        Self { time, space }
    }

    pub fn time(&self) -> Grid {
        self.time
    }

    pub fn space(&self) -> Grid {
        self.space
    }

    /// Number of unknowns solved for at each step.
    pub fn interior_points(&self) -> usize {
        self.space.steps.saturating_sub(1)
    }

    /// `dt / dx²`
    pub fn ratio(&self) -> Float {
        self.time.delta / (self.space.delta * self.space.delta)
    }
}
