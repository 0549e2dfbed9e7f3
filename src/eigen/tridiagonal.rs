use anyhow::Result;
use log::debug;
use nalgebra::DMatrix;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::dynamical::TridiagonalMatrix;
use crate::eigen::Eigenpairs;

const PIVOT_GUARD: f64 = 1e-300;
const MAX_BISECTIONS: usize = 200;
const INVERSE_ITERATIONS: usize = 3;
/// Eigenvalues closer than this fraction of the matrix scale share a cluster and get
/// their vectors re-orthogonalized against each other.
const CLUSTER_GAP: f64 = 1e-5;

/// Eigen-solver specialised to real symmetric tridiagonal matrices.
///
/// Works on the two diagonals directly; nothing of order `N²` is formed except the
/// eigenvector matrix itself.
pub struct TridiagonalSolver;

impl TridiagonalSolver {
    /// Full eigenpairs, ascending: Sturm bisection for the eigenvalues, then inverse
    /// iteration on `T - λI` for each vector.
    pub fn eigenpairs(matrix: &TridiagonalMatrix) -> Result<Eigenpairs<f64>> {
        let n = matrix.order();
        if n == 0 {
            return Ok(Eigenpairs {
                eigenvalues: Vec::new(),
                eigenvectors: DMatrix::zeros(0, 0),
            });
        }
        if !is_finite(matrix) {
            debug!("tridiagonal matrix of order {} has non-finite entries", n);
            return Ok(Eigenpairs::not_a_number(n));
        }

        let eigenvalues = Self::eigenvalues(matrix);
        let scale = spectral_scale(matrix);
        let mut eigenvectors = DMatrix::<f64>::zeros(n, n);
        let mut cluster_start = 0;
        for (index, &lambda) in eigenvalues.iter().enumerate() {
            if index > 0 && lambda - eigenvalues[index - 1] > CLUSTER_GAP * scale {
                cluster_start = index;
            }
            let vector = inverse_iteration(matrix, lambda, scale, index, |x| {
                for previous in cluster_start..index {
                    let column = eigenvectors.column(previous);
                    let overlap: f64 = x.iter().zip(column.iter()).map(|(a, b)| a * b).sum();
                    x.iter_mut()
                        .zip(column.iter())
                        .for_each(|(a, b)| *a -= overlap * b);
                }
            });
            eigenvectors.column_mut(index).copy_from_slice(&vector);
        }

        Ok(Eigenpairs {
            eigenvalues,
            eigenvectors,
        })
    }

    /// Number of eigenvalues strictly below `lambda`, from the signs of the LDLᵀ pivots.
    pub fn count_below(matrix: &TridiagonalMatrix, lambda: f64) -> usize {
        let diagonal = &matrix.diagonal;
        let off = &matrix.off_diagonal;
        if diagonal.is_empty() {
            return 0;
        }

        let mut pivot = diagonal[0] - lambda;
        let mut count = usize::from(pivot < 0.0);
        for i in 1..diagonal.len() {
            let guarded = if pivot.abs() < PIVOT_GUARD {
                PIVOT_GUARD.copysign(pivot)
            } else {
                pivot
            };
            pivot = (diagonal[i] - lambda) - off[i - 1] * off[i - 1] / guarded;
            if pivot < 0.0 {
                count += 1;
            }
        }
        count
    }

    /// Eigenvalues only, ascending, by Sturm bisection inside the Gershgorin interval.
    pub fn eigenvalues(matrix: &TridiagonalMatrix) -> Vec<f64> {
        let n = matrix.order();
        if n == 0 {
            return Vec::new();
        }
        if !is_finite(matrix) {
            return vec![f64::NAN; n];
        }

        let (mut lower, mut upper) = gershgorin_bounds(matrix);
        let scale = lower.abs().max(upper.abs());
        let pad = scale * 1e-12 + f64::MIN_POSITIVE;
        lower -= pad;
        upper += pad;

        (0..n)
            .map(|index| {
                let (mut a, mut b) = (lower, upper);
                for _ in 0..MAX_BISECTIONS {
                    // absolute floor of ε·‖T‖ lets eigenvalues at zero terminate
                    if b - a <= f64::EPSILON * (a.abs() + b.abs() + scale) {
                        break;
                    }
                    let mid = 0.5 * (a + b);
                    if Self::count_below(matrix, mid) <= index {
                        a = mid;
                    } else {
                        b = mid;
                    }
                }
                0.5 * (a + b)
            })
            .collect()
    }
}

fn is_finite(matrix: &TridiagonalMatrix) -> bool {
    matrix
        .diagonal
        .iter()
        .chain(matrix.off_diagonal.iter())
        .all(|v| v.is_finite())
}

fn gershgorin_bounds(matrix: &TridiagonalMatrix) -> (f64, f64) {
    let n = matrix.order();
    let off = &matrix.off_diagonal;
    let mut lower = f64::MAX;
    let mut upper = f64::MIN;
    for (i, &d) in matrix.diagonal.iter().enumerate() {
        let left = if i > 0 { off[i - 1].abs() } else { 0.0 };
        let right = if i + 1 < n { off[i].abs() } else { 0.0 };
        lower = lower.min(d - left - right);
        upper = upper.max(d + left + right);
    }
    (lower, upper)
}

/// Magnitude of the widest Gershgorin bound, or 1 for the zero matrix.
fn spectral_scale(matrix: &TridiagonalMatrix) -> f64 {
    let (lower, upper) = gershgorin_bounds(matrix);
    let scale = lower.abs().max(upper.abs());
    if scale > 0.0 { scale } else { 1.0 }
}

/// LU factors of `T - λI` with partial pivoting.
///
/// `U` has two superdiagonals; `L` is kept as one multiplier per step plus the row swap.
struct ShiftedFactors {
    diagonal: Vec<f64>,
    first: Vec<f64>,
    second: Vec<f64>,
    multipliers: Vec<f64>,
    swapped: Vec<bool>,
}

impl ShiftedFactors {
    fn factor(matrix: &TridiagonalMatrix, shift: f64, tiny: f64) -> Self {
        let n = matrix.order();
        let d = &matrix.diagonal;
        let e = &matrix.off_diagonal;
        let guard = |pivot: f64| {
            if pivot.abs() < tiny {
                if pivot < 0.0 { -tiny } else { tiny }
            } else {
                pivot
            }
        };

        let mut diagonal = vec![0.0; n];
        let mut first = vec![0.0; n];
        let mut second = vec![0.0; n];
        let mut multipliers = vec![0.0; n - 1];
        let mut swapped = vec![false; n - 1];

        // pending row k holds `pending_diag` at column k and `pending_super` at k + 1
        let mut pending_diag = d[0] - shift;
        let mut pending_super = e.first().copied().unwrap_or(0.0);
        for k in 0..n - 1 {
            let below = e[k];
            let next_diag = d[k + 1] - shift;
            let next_super = if k + 2 < n { e[k + 1] } else { 0.0 };

            if pending_diag.abs() >= below.abs() {
                let pivot = guard(pending_diag);
                let multiplier = below / pivot;
                diagonal[k] = pivot;
                first[k] = pending_super;
                multipliers[k] = multiplier;
                pending_diag = next_diag - multiplier * pending_super;
                pending_super = next_super;
            } else {
                let multiplier = pending_diag / below;
                diagonal[k] = below;
                first[k] = next_diag;
                second[k] = next_super;
                multipliers[k] = multiplier;
                swapped[k] = true;
                pending_diag = pending_super - multiplier * next_diag;
                pending_super = -multiplier * next_super;
            }
        }
        diagonal[n - 1] = guard(pending_diag);

        Self {
            diagonal,
            first,
            second,
            multipliers,
            swapped,
        }
    }

    /// Overwrites `x` with `(T - λI)⁻¹ x`.
    fn solve(&self, x: &mut [f64]) {
        let n = x.len();
        for k in 0..n - 1 {
            if self.swapped[k] {
                x.swap(k, k + 1);
            }
            x[k + 1] -= self.multipliers[k] * x[k];
        }
        x[n - 1] /= self.diagonal[n - 1];
        for k in (0..n - 1).rev() {
            let mut value = x[k] - self.first[k] * x[k + 1];
            if k + 2 < n {
                value -= self.second[k] * x[k + 2];
            }
            x[k] = value / self.diagonal[k];
        }
    }
}

/// Eigenvector for an accurate eigenvalue `lambda`, unit length, largest component positive.
///
/// `orthogonalize` removes components along vectors already found in the same cluster.
fn inverse_iteration(
    matrix: &TridiagonalMatrix,
    lambda: f64,
    scale: f64,
    seed: usize,
    mut orthogonalize: impl FnMut(&mut [f64]),
) -> Vec<f64> {
    let n = matrix.order();
    if n == 1 {
        return vec![1.0];
    }
    let factors = ShiftedFactors::factor(matrix, lambda, f64::EPSILON * scale);

    // a random start cannot be orthogonal to the wanted vector by symmetry
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed as u64);
    let mut x: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    for _ in 0..INVERSE_ITERATIONS {
        orthogonalize(&mut x);
        normalize(&mut x);
        factors.solve(&mut x);
    }
    orthogonalize(&mut x);
    normalize(&mut x);

    let leading = x.iter().fold(0.0f64, |acc, v| if v.abs() > acc.abs() { *v } else { acc });
    if leading < 0.0 {
        x.iter_mut().for_each(|v| *v = -*v);
    }
    x
}

fn normalize(x: &mut [f64]) {
    let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 && norm.is_finite() {
        x.iter_mut().for_each(|v| *v /= norm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eigen::hermitian_eigenpairs;

    fn two_by_two() -> TridiagonalMatrix {
        TridiagonalMatrix::new(vec![1.0, 3.0], vec![-1.0]).expect("matrix")
    }

    fn free_chain(n: usize) -> TridiagonalMatrix {
        let mut diagonal = vec![2.0; n];
        diagonal[0] = 1.0;
        diagonal[n - 1] = 1.0;
        TridiagonalMatrix::new(diagonal, vec![-1.0; n - 1]).expect("matrix")
    }

    fn residual(matrix: &TridiagonalMatrix, lambda: f64, v: &[f64]) -> f64 {
        let n = matrix.order();
        (0..n)
            .map(|i| {
                let mut row = (matrix.diagonal[i] - lambda) * v[i];
                if i > 0 {
                    row += matrix.off_diagonal[i - 1] * v[i - 1];
                }
                if i + 1 < n {
                    row += matrix.off_diagonal[i] * v[i + 1];
                }
                row * row
            })
            .sum::<f64>()
            .sqrt()
    }

    #[test]
    fn counts_eigenvalues_below_shift() {
        // eigenvalues 2 ± sqrt(2)
        let matrix = two_by_two();
        assert_eq!(TridiagonalSolver::count_below(&matrix, 0.0), 0);
        assert_eq!(TridiagonalSolver::count_below(&matrix, 1.0), 1);
        assert_eq!(TridiagonalSolver::count_below(&matrix, 4.0), 2);
    }

    #[test]
    fn eigenpairs_agree_with_dense_solver() {
        let matrix = TridiagonalMatrix::new(
            vec![1.0, 2.5, 2.0, 3.0, 1.2],
            vec![-0.5, -1.0, -0.7, -0.9],
        )
        .expect("matrix");
        let tridiagonal = TridiagonalSolver::eigenpairs(&matrix).expect("eigenpairs");
        let dense = hermitian_eigenpairs(matrix.to_dense()).expect("dense eigenpairs");
        for i in 0..matrix.order() {
            let (a, b) = (tridiagonal.eigenvalues[i], dense.eigenvalues[i]);
            assert!((a - b).abs() < 1e-10, "eigenvalue {i}: {a} vs {b}");
            let overlap = tridiagonal
                .eigenvectors
                .column(i)
                .dot(&dense.eigenvectors.column(i))
                .abs();
            assert!((overlap - 1.0).abs() < 1e-8, "eigenvector {i}: overlap {overlap}");
        }
    }

    #[test]
    fn free_chain_matches_closed_form() {
        // Open uniform chain: λ_j = 4 sin²(jπ / 2N)
        let n = 40;
        let values = TridiagonalSolver::eigenvalues(&free_chain(n));
        for (j, value) in values.iter().enumerate() {
            let exact = 4.0 * (j as f64 * std::f64::consts::PI / (2.0 * n as f64)).sin().powi(2);
            assert!((value - exact).abs() < 1e-10, "j={j}: {value} vs {exact}");
        }
    }

    #[test]
    fn long_chain_vectors_are_orthonormal_eigenvectors() {
        let matrix = free_chain(400);
        let pairs = TridiagonalSolver::eigenpairs(&matrix).expect("eigenpairs");
        for (i, &lambda) in pairs.eigenvalues.iter().enumerate() {
            let column: Vec<f64> = pairs.eigenvectors.column(i).iter().copied().collect();
            assert!(residual(&matrix, lambda, &column) < 1e-9, "mode {i} residual");
        }
        let gram = pairs.eigenvectors.transpose() * &pairs.eigenvectors;
        for i in 0..matrix.order() {
            for j in 0..matrix.order() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((gram[(i, j)] - expected).abs() < 1e-8, "gram[{i},{j}] = {}", gram[(i, j)]);
            }
        }
    }

    #[test]
    fn tiny_scale_keeps_relative_accuracy() {
        let mut matrix = free_chain(20);
        matrix.diagonal.iter_mut().for_each(|d| *d *= 1e-12);
        matrix.off_diagonal.iter_mut().for_each(|e| *e *= 1e-12);
        let values = TridiagonalSolver::eigenvalues(&matrix);
        let exact = 4e-12 * (19.0 * std::f64::consts::PI / 40.0).sin().powi(2);
        assert!((values[19] - exact).abs() < 1e-10 * exact);
    }

    #[test]
    fn non_finite_entries_propagate_as_nan() {
        let matrix = TridiagonalMatrix::new(vec![f64::NAN, 1.0], vec![-1.0]).expect("matrix");
        let pairs = TridiagonalSolver::eigenpairs(&matrix).expect("eigenpairs");
        assert!(pairs.eigenvalues.iter().all(|v| v.is_nan()));
    }
}
