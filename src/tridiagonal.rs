//! Thomas algorithm for tridiagonal systems.
//!
//! The system is stored as three column vectors
//!
//! ```text
//! ┌                        ┐ ┌      ┐   ┌      ┐
//! │ d₀   c₀                │ │ x₀   │   │ b₀   │
//! │ a₀   d₁   c₁           │ │ x₁   │   │ b₁   │
//! │      ⋱    ⋱    ⋱       │ │ ⋮    │ = │ ⋮    │
//! │         aₙ₋₂   dₙ₋₁    │ │ xₙ₋₁ │   │ bₙ₋₁ │
//! └                        ┘ └      ┘   └      ┘
//! ```
//!
//! with `a` (sub-diagonal) and `c` (super-diagonal) of length `n - 1`.
//! No pivoting is performed: the matrix must be diagonally dominant.

use faer_core::{mul::matmul, Mat, MatMut, MatRef, Parallelism};
use reborrow::*;
use thiserror::Error;

use crate::Float;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SolveError {
    #[error("pivot {pivot:e} at row {row} is singular")]
    SingularPivot { row: usize, pivot: Float },
}

fn check_shapes(
    sub: MatRef<Float>,
    diag: MatRef<Float>,
    sup: MatRef<Float>,
    rhs: MatRef<Float>,
) {
    let n = diag.nrows();
    assert!(n >= 1, "empty tridiagonal system");
    assert_eq!(sub.nrows(), n - 1);
    assert_eq!(sup.nrows(), n - 1);
    assert_eq!(rhs.nrows(), n);
}

// eliminates the sub-diagonal, leaving an upper bidiagonal system in (diag, sup)
fn forward_sweep(
    sub: MatRef<Float>,
    mut diag: MatMut<Float>,
    sup: MatRef<Float>,
    mut rhs: MatMut<Float>,
) {
    for i in 1..diag.nrows() {
        let m = sub.read(i - 1, 0) / diag.read(i - 1, 0);
        diag.write(i, 0, diag.read(i, 0) - m * sup.read(i - 1, 0));
        rhs.write(i, 0, rhs.read(i, 0) - m * rhs.read(i - 1, 0));
    }
}

fn guarded_forward_sweep(
    sub: MatRef<Float>,
    mut diag: MatMut<Float>,
    sup: MatRef<Float>,
    mut rhs: MatMut<Float>,
    tolerance: Float,
) -> Result<(), SolveError> {
    let n = diag.nrows();
    for i in 0..n {
        let pivot = diag.read(i, 0);
        if !pivot.is_finite() || pivot.abs() <= tolerance {
            return Err(SolveError::SingularPivot { row: i, pivot });
        }
        if i + 1 < n {
            let m = sub.read(i, 0) / pivot;
            diag.write(i + 1, 0, diag.read(i + 1, 0) - m * sup.read(i, 0));
            rhs.write(i + 1, 0, rhs.read(i + 1, 0) - m * rhs.read(i, 0));
        }
    }
    Ok(())
}

fn back_substitute(
    diag: MatRef<Float>,
    sup: MatRef<Float>,
    rhs: MatRef<Float>,
    mut out: MatMut<Float>,
) {
    let n = diag.nrows();
    out.write(n - 1, 0, rhs.read(n - 1, 0) / diag.read(n - 1, 0));
    for i in (0..n - 1).rev() {
        let xi = (rhs.read(i, 0) - sup.read(i, 0) * out.read(i + 1, 0)) / diag.read(i, 0);
        out.write(i, 0, xi);
    }
}

/// Solves `A x = rhs` into `out`. `diag` and `rhs` are overwritten by the
/// elimination; a zero pivot turns the solution into `inf`/`NaN`.
pub fn solve_to(
    sub: MatRef<Float>,
    mut diag: MatMut<Float>,
    sup: MatRef<Float>,
    mut rhs: MatMut<Float>,
    mut out: MatMut<Float>,
) {
    check_shapes(sub, diag.rb(), sup, rhs.rb());
    assert_eq!(out.nrows(), diag.nrows());

    forward_sweep(sub, diag.rb_mut(), sup, rhs.rb_mut());
    back_substitute(diag.rb(), sup, rhs.rb(), out.rb_mut());
}

pub fn solve_in_place(
    sub: MatRef<Float>,
    mut diag: MatMut<Float>,
    sup: MatRef<Float>,
    mut rhs: MatMut<Float>,
) {
    check_shapes(sub, diag.rb(), sup, rhs.rb());

    forward_sweep(sub, diag.rb_mut(), sup, rhs.rb_mut());

    let n = diag.nrows();
    rhs.write(n - 1, 0, rhs.read(n - 1, 0) / diag.read(n - 1, 0));
    for i in (0..n - 1).rev() {
        let xi = (rhs.read(i, 0) - sup.read(i, 0) * rhs.read(i + 1, 0)) / diag.read(i, 0);
        rhs.write(i, 0, xi);
    }
}

/// Checked [`solve_to`]: every pivot must be finite and larger than `tolerance`.
pub fn try_solve_to(
    sub: MatRef<Float>,
    mut diag: MatMut<Float>,
    sup: MatRef<Float>,
    mut rhs: MatMut<Float>,
    mut out: MatMut<Float>,
    tolerance: Float,
) -> Result<(), SolveError> {
    check_shapes(sub, diag.rb(), sup, rhs.rb());
    assert_eq!(out.nrows(), diag.nrows());

    guarded_forward_sweep(sub, diag.rb_mut(), sup, rhs.rb_mut(), tolerance)?;
    back_substitute(diag.rb(), sup, rhs.rb(), out.rb_mut());
    Ok(())
}

/// Owned tridiagonal matrix, mostly useful to check solutions.
#[derive(Debug, Clone)]
pub struct Tridiagonal {
    pub sub: Mat<Float>,
    pub diag: Mat<Float>,
    pub sup: Mat<Float>,
}

impl Tridiagonal {
    pub fn from_slices(sub: &[Float], diag: &[Float], sup: &[Float]) -> Self {
        let n = diag.len();
        assert!(n >= 1, "empty tridiagonal system");
        assert_eq!(sub.len(), n - 1);
        assert_eq!(sup.len(), n - 1);
        Self {
            sub: Mat::from_fn(n - 1, 1, |i, _| sub[i]),
            diag: Mat::from_fn(n, 1, |i, _| diag[i]),
            sup: Mat::from_fn(n - 1, 1, |i, _| sup[i]),
        }
    }

    pub fn dim(&self) -> usize {
        self.diag.nrows()
    }

    pub fn to_dense(&self) -> Mat<Float> {
        Mat::from_fn(self.dim(), self.dim(), |i, j| {
            if i == j {
                self.diag.read(i, 0)
            } else if i == j + 1 {
                self.sub.read(j, 0)
            } else if j == i + 1 {
                self.sup.read(i, 0)
            } else {
                0.0
            }
        })
    }

    pub fn apply(&self, x: MatRef<Float>) -> Mat<Float> {
        let mut out = Mat::zeros(self.dim(), 1);
        matmul(
            out.as_mut(),
            self.to_dense().as_ref(),
            x,
            None,
            1.0,
            Parallelism::None,
        );
        out
    }

    pub fn solve(&self, rhs: MatRef<Float>) -> Mat<Float> {
        let mut diag = self.diag.clone();
        let mut x = rhs.to_owned();
        solve_in_place(
            self.sub.as_ref(),
            diag.as_mut(),
            self.sup.as_ref(),
            x.as_mut(),
        );
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn column(values: &[Float]) -> Mat<Float> {
        Mat::from_fn(values.len(), 1, |i, _| values[i])
    }

    // dense gaussian elimination with partial pivoting, used as reference
    fn dense_solve(a: &Mat<Float>, b: &Mat<Float>) -> Mat<Float> {
        let n = a.nrows();
        let mut a = a.clone();
        let mut b = b.clone();
        for k in 0..n {
            let p = (k..n)
                .max_by(|&i, &j| a.read(i, k).abs().total_cmp(&a.read(j, k).abs()))
                .unwrap();
            for j in 0..n {
                let (akj, apj) = (a.read(k, j), a.read(p, j));
                a.write(k, j, apj);
                a.write(p, j, akj);
            }
            let (bk, bp) = (b.read(k, 0), b.read(p, 0));
            b.write(k, 0, bp);
            b.write(p, 0, bk);

            for i in k + 1..n {
                let m = a.read(i, k) / a.read(k, k);
                for j in k..n {
                    a.write(i, j, a.read(i, j) - m * a.read(k, j));
                }
                b.write(i, 0, b.read(i, 0) - m * b.read(k, 0));
            }
        }
        let mut x = Mat::zeros(n, 1);
        for i in (0..n).rev() {
            let mut s = b.read(i, 0);
            for j in i + 1..n {
                s -= a.read(i, j) * x.read(j, 0);
            }
            x.write(i, 0, s / a.read(i, i));
        }
        x
    }

    fn max_abs_diff(a: &Mat<Float>, b: &Mat<Float>) -> Float {
        (0..a.nrows())
            .map(|i| (a.read(i, 0) - b.read(i, 0)).abs())
            .fold(0.0, Float::max)
    }

    #[test]
    fn closed_form_three_by_three() {
        let system = Tridiagonal::from_slices(&[1.0, 1.0], &[4.0, 4.0, 4.0], &[1.0, 1.0]);
        let b = column(&[5.0, 10.0, 9.0]);

        let x = system.solve(b.as_ref());
        let reference = dense_solve(&system.to_dense(), &b);

        assert!(max_abs_diff(&x, &reference) < 1e-12);
        // 4x0 + x1 = 5, x0 + 4x1 + x2 = 10, x1 + 4x2 = 9
        assert_relative_eq!(x.read(0, 0), 11.0 / 14.0, max_relative = 1e-12);
        assert_relative_eq!(x.read(1, 0), 13.0 / 7.0, max_relative = 1e-12);
        assert_relative_eq!(x.read(2, 0), 25.0 / 14.0, max_relative = 1e-12);
    }

    #[test]
    fn residual_of_diagonally_dominant_systems() {
        for n in [1usize, 2, 5, 17, 64] {
            // deterministic, non-symmetric, strictly diagonally dominant
            let sub: Vec<Float> = (0..n.saturating_sub(1))
                .map(|i| -0.3 - 0.1 * ((i * 7) % 5) as Float)
                .collect();
            let sup: Vec<Float> = (0..n.saturating_sub(1))
                .map(|i| 0.2 + 0.15 * ((i * 3) % 4) as Float)
                .collect();
            let diag: Vec<Float> = (0..n).map(|i| 2.5 + (i % 3) as Float).collect();
            let b = Mat::from_fn(n, 1, |i, _| (i as Float * 0.7).sin() + 1.0);

            let system = Tridiagonal::from_slices(&sub, &diag, &sup);
            let x = system.solve(b.as_ref());

            let residual = max_abs_diff(&system.apply(x.as_ref()), &b);
            assert!(residual < 1e-9, "n = {n}: residual {residual:e}");

            let reference = dense_solve(&system.to_dense(), &b);
            assert!(max_abs_diff(&x, &reference) < 1e-9, "n = {n}");
        }
    }

    #[test]
    fn solve_to_matches_in_place() {
        let sub = column(&[-0.5, -0.5, -0.5]);
        let sup = sub.clone();
        let mut diag_a = column(&[2.0, 2.0, 2.0, 2.0]);
        let mut diag_b = diag_a.clone();
        let mut rhs_a = column(&[1.0, 0.0, 0.0, 1.0]);
        let mut rhs_b = rhs_a.clone();
        let mut out = Mat::zeros(4, 1);

        solve_to(
            sub.as_ref(),
            diag_a.as_mut(),
            sup.as_ref(),
            rhs_a.as_mut(),
            out.as_mut(),
        );
        solve_in_place(
            sub.as_ref(),
            diag_b.as_mut(),
            sup.as_ref(),
            rhs_b.as_mut(),
        );

        for i in 0..4 {
            assert_eq!(out.read(i, 0), rhs_b.read(i, 0));
        }
        // inputs were consumed by the elimination
        assert_ne!(diag_a.read(3, 0), 2.0);
    }

    #[test]
    fn one_by_one() {
        let empty = Mat::<Float>::zeros(0, 1);
        let mut diag = column(&[4.0]);
        let mut rhs = column(&[2.0]);
        solve_in_place(
            empty.as_ref(),
            diag.as_mut(),
            empty.as_ref(),
            rhs.as_mut(),
        );
        assert_eq!(rhs.read(0, 0), 0.5);
    }

    #[test]
    fn zero_pivot_propagates_silently() {
        let sub = column(&[1.0]);
        let sup = column(&[1.0]);
        let mut diag = column(&[0.0, 1.0]);
        let mut rhs = column(&[1.0, 1.0]);
        let mut out = Mat::zeros(2, 1);

        solve_to(
            sub.as_ref(),
            diag.as_mut(),
            sup.as_ref(),
            rhs.as_mut(),
            out.as_mut(),
        );

        assert!((0..2).any(|i| !out.read(i, 0).is_finite()));
    }

    #[test]
    fn guarded_solve_reports_zero_pivot() {
        let sub = column(&[1.0]);
        let sup = column(&[1.0]);
        let mut diag = column(&[0.0, 1.0]);
        let mut rhs = column(&[1.0, 1.0]);
        let mut out = Mat::zeros(2, 1);

        let err = try_solve_to(
            sub.as_ref(),
            diag.as_mut(),
            sup.as_ref(),
            rhs.as_mut(),
            out.as_mut(),
            1e-300,
        )
        .unwrap_err();

        assert_eq!(err, SolveError::SingularPivot { row: 0, pivot: 0.0 });
        assert_eq!(out.read(0, 0), 0.0);
    }

    #[test]
    fn guarded_solve_agrees_on_regular_systems() {
        let sub = column(&[1.0, 1.0]);
        let sup = sub.clone();
        let mut diag = column(&[4.0, 4.0, 4.0]);
        let mut rhs = column(&[5.0, 10.0, 9.0]);
        let mut out = Mat::zeros(3, 1);

        try_solve_to(
            sub.as_ref(),
            diag.as_mut(),
            sup.as_ref(),
            rhs.as_mut(),
            out.as_mut(),
            1e-12,
        )
        .unwrap();

        assert_relative_eq!(out.read(2, 0), 25.0 / 14.0, max_relative = 1e-12);
    }

    #[test]
    #[should_panic]
    fn mismatched_lengths() {
        let sub = column(&[1.0]);
        let sup = column(&[1.0, 1.0]);
        let mut diag = column(&[4.0, 4.0]);
        let mut rhs = column(&[1.0, 1.0]);
        solve_in_place(sub.as_ref(), diag.as_mut(), sup.as_ref(), rhs.as_mut());
    }
}
