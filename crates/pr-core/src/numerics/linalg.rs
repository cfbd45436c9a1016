use faer::Mat;

pub type DenseRealMatrix = Mat<f64>;

const JACOBI_OFF_DIAGONAL_EPSILON: f64 = 1.0e-24;
const JACOBI_MAX_SWEEPS: usize = 100;
const PINV_RELATIVE_CUTOFF: f64 = 1.0e-15;
const SVD_ORTHOGONALITY_EPSILON: f64 = 1.0e-15;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinalgError {
    #[error("linear solve requires a non-empty matrix")]
    EmptyMatrix,
    #[error("right-hand side length mismatch: expected {expected}, got {actual}")]
    RhsLengthMismatch { expected: usize, actual: usize },
    #[error("symmetric routines require a square matrix, got {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },
    #[error("matrix contains a non-finite entry at ({row},{col})")]
    NonFinite { row: usize, col: usize },
    #[error("Jacobi rotations did not converge after {sweeps} sweeps")]
    NoConvergence { sweeps: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquaresSolution {
    pub coefficients: Vec<f64>,
    /// Squared 2-norm of `A x - b`.
    pub residual_sum_of_squares: f64,
    /// Numerical rank of `A`; below `A.ncols()` the solution is the
    /// minimum-norm one.
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricEigen {
    pub eigenvalues: Vec<f64>,
    /// Eigenvectors stored column-wise, matching `eigenvalues`.
    pub eigenvectors: DenseRealMatrix,
}

/// Minimum-norm solution of `min |A x - b|^2` from a one-sided Jacobi SVD.
///
/// Singular values at or below `eps * max(rows, cols) * sigma_max` are
/// dropped, so dependent columns and underdetermined systems still solve.
/// [`LeastSquaresSolution::rank`] counts the singular values kept.
pub fn solve_least_squares(
    matrix: &DenseRealMatrix,
    rhs: &[f64],
) -> Result<LeastSquaresSolution, LinalgError> {
    let rows = matrix.nrows();
    let cols = matrix.ncols();
    if rows == 0 || cols == 0 {
        return Err(LinalgError::EmptyMatrix);
    }
    if rhs.len() != rows {
        return Err(LinalgError::RhsLengthMismatch {
            expected: rows,
            actual: rhs.len(),
        });
    }
    validate_finite(matrix)?;

    let (work, vectors) = orthogonalize_columns(matrix)?;
    let singular_values: Vec<f64> = (0..cols)
        .map(|col| column_dot(&work, col, col).sqrt())
        .collect();
    let largest = singular_values.iter().fold(0.0_f64, |acc, value| acc.max(*value));
    let cutoff = rank_tolerance(rows, cols) * largest;

    // x = sum_j v_j (u_j . b) / sigma_j, with u_j sigma_j stored in `work`.
    let mut coefficients = vec![0.0; cols];
    let mut rank = 0;
    for (col, &sigma) in singular_values.iter().enumerate() {
        if sigma <= cutoff {
            continue;
        }
        rank += 1;
        let projection: f64 = (0..rows).map(|row| work[(row, col)] * rhs[row]).sum();
        let weight = projection / (sigma * sigma);
        for (index, coefficient) in coefficients.iter_mut().enumerate() {
            *coefficient += weight * vectors[(index, col)];
        }
    }

    let residual_sum_of_squares = (0..rows)
        .map(|row| {
            let fitted: f64 = (0..cols)
                .map(|col| matrix[(row, col)] * coefficients[col])
                .sum();
            let diff = fitted - rhs[row];
            diff * diff
        })
        .sum();

    Ok(LeastSquaresSolution {
        coefficients,
        residual_sum_of_squares,
        rank,
    })
}

/// `A^T A` for a dense matrix.
pub fn gram_matrix(matrix: &DenseRealMatrix) -> DenseRealMatrix {
    let cols = matrix.ncols();
    let mut gram = DenseRealMatrix::zeros(cols, cols);
    for i in 0..cols {
        for j in i..cols {
            let mut sum = 0.0;
            for k in 0..matrix.nrows() {
                sum += matrix[(k, i)] * matrix[(k, j)];
            }
            gram[(i, j)] = sum;
            gram[(j, i)] = sum;
        }
    }
    gram
}

/// Cyclic Jacobi eigen-decomposition of a real symmetric matrix.
pub fn symmetric_eigen(matrix: &DenseRealMatrix) -> Result<SymmetricEigen, LinalgError> {
    let dimension = validate_square(matrix)?;
    validate_finite(matrix)?;

    let mut work = matrix.clone();
    let mut vectors = identity(dimension);

    let mut converged = false;
    for _sweep in 0..JACOBI_MAX_SWEEPS {
        let (off_diagonal, frobenius) = off_diagonal_and_frobenius(&work);
        if off_diagonal <= JACOBI_OFF_DIAGONAL_EPSILON * frobenius {
            converged = true;
            break;
        }

        for p in 0..dimension {
            for q in (p + 1)..dimension {
                let apq = work[(p, q)];
                if apq == 0.0 {
                    continue;
                }

                let theta = (work[(q, q)] - work[(p, p)]) / (2.0 * apq);
                let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
                let t = sign / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                rotate_columns(&mut work, p, q, c, s);
                rotate_rows(&mut work, p, q, c, s);
                rotate_columns(&mut vectors, p, q, c, s);
            }
        }
    }

    if !converged {
        let (off_diagonal, frobenius) = off_diagonal_and_frobenius(&work);
        if off_diagonal > JACOBI_OFF_DIAGONAL_EPSILON * frobenius {
            return Err(LinalgError::NoConvergence {
                sweeps: JACOBI_MAX_SWEEPS,
            });
        }
    }

    let eigenvalues = (0..dimension).map(|index| work[(index, index)]).collect();
    Ok(SymmetricEigen {
        eigenvalues,
        eigenvectors: vectors,
    })
}

/// Moore-Penrose pseudo-inverse of a symmetric matrix; eigenvalues below
/// `1e-15` of the largest magnitude are treated as zero.
pub fn pseudo_inverse_symmetric(matrix: &DenseRealMatrix) -> Result<DenseRealMatrix, LinalgError> {
    let decomposition = symmetric_eigen(matrix)?;
    let dimension = decomposition.eigenvalues.len();
    let largest = decomposition
        .eigenvalues
        .iter()
        .fold(0.0_f64, |acc, value| acc.max(value.abs()));
    let cutoff = PINV_RELATIVE_CUTOFF * largest;

    let mut inverse = DenseRealMatrix::zeros(dimension, dimension);
    for (index, &eigenvalue) in decomposition.eigenvalues.iter().enumerate() {
        if eigenvalue.abs() <= cutoff {
            continue;
        }
        let weight = 1.0 / eigenvalue;
        for row in 0..dimension {
            let scaled = decomposition.eigenvectors[(row, index)] * weight;
            for col in 0..dimension {
                inverse[(row, col)] += scaled * decomposition.eigenvectors[(col, index)];
            }
        }
    }

    Ok(inverse)
}

/// Hestenes rotations applied until every pair of columns of `A V` is
/// orthogonal. Returns `(A V, V)`; the column norms of `A V` are the
/// singular values. Columns already below the rank tolerance are left alone.
fn orthogonalize_columns(
    matrix: &DenseRealMatrix,
) -> Result<(DenseRealMatrix, DenseRealMatrix), LinalgError> {
    let cols = matrix.ncols();
    let negligible = rank_tolerance(matrix.nrows(), cols) * frobenius_norm(matrix);
    let mut work = matrix.clone();
    let mut vectors = identity(cols);

    for _sweep in 0..JACOBI_MAX_SWEEPS {
        let mut rotated = false;
        for p in 0..cols {
            for q in (p + 1)..cols {
                let alpha = column_dot(&work, p, p);
                let beta = column_dot(&work, q, q);
                let gamma = column_dot(&work, p, q);
                if gamma == 0.0
                    || alpha.min(beta).sqrt() <= negligible
                    || gamma.abs() <= SVD_ORTHOGONALITY_EPSILON * (alpha * beta).sqrt()
                {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let sign = if zeta >= 0.0 { 1.0 } else { -1.0 };
                let t = sign / (zeta.abs() + (zeta * zeta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                rotate_columns(&mut work, p, q, c, s);
                rotate_columns(&mut vectors, p, q, c, s);
            }
        }
        if !rotated {
            return Ok((work, vectors));
        }
    }

    Err(LinalgError::NoConvergence {
        sweeps: JACOBI_MAX_SWEEPS,
    })
}

fn rank_tolerance(rows: usize, cols: usize) -> f64 {
    f64::EPSILON * rows.max(cols) as f64
}

fn column_dot(matrix: &DenseRealMatrix, left: usize, right: usize) -> f64 {
    (0..matrix.nrows())
        .map(|row| matrix[(row, left)] * matrix[(row, right)])
        .sum()
}

fn frobenius_norm(matrix: &DenseRealMatrix) -> f64 {
    let mut sum = 0.0;
    for row in 0..matrix.nrows() {
        for col in 0..matrix.ncols() {
            sum += matrix[(row, col)] * matrix[(row, col)];
        }
    }
    sum.sqrt()
}

fn identity(dimension: usize) -> DenseRealMatrix {
    DenseRealMatrix::from_fn(dimension, dimension, |row, col| {
        if row == col { 1.0 } else { 0.0 }
    })
}

fn validate_square(matrix: &DenseRealMatrix) -> Result<usize, LinalgError> {
    let rows = matrix.nrows();
    let cols = matrix.ncols();
    if rows == 0 || cols == 0 {
        return Err(LinalgError::EmptyMatrix);
    }
    if rows != cols {
        return Err(LinalgError::NonSquareMatrix { rows, cols });
    }
    Ok(rows)
}

fn validate_finite(matrix: &DenseRealMatrix) -> Result<(), LinalgError> {
    for row in 0..matrix.nrows() {
        for col in 0..matrix.ncols() {
            if !matrix[(row, col)].is_finite() {
                return Err(LinalgError::NonFinite { row, col });
            }
        }
    }
    Ok(())
}

fn off_diagonal_and_frobenius(matrix: &DenseRealMatrix) -> (f64, f64) {
    let mut off_diagonal = 0.0;
    let mut frobenius = 0.0;
    for row in 0..matrix.nrows() {
        for col in 0..matrix.ncols() {
            let value_sq = matrix[(row, col)] * matrix[(row, col)];
            frobenius += value_sq;
            if row != col {
                off_diagonal += value_sq;
            }
        }
    }
    (off_diagonal, frobenius)
}

fn rotate_columns(matrix: &mut DenseRealMatrix, p: usize, q: usize, c: f64, s: f64) {
    for row in 0..matrix.nrows() {
        let kp = matrix[(row, p)];
        let kq = matrix[(row, q)];
        matrix[(row, p)] = c * kp - s * kq;
        matrix[(row, q)] = s * kp + c * kq;
    }
}

fn rotate_rows(matrix: &mut DenseRealMatrix, p: usize, q: usize, c: f64, s: f64) {
    for col in 0..matrix.ncols() {
        let pk = matrix[(p, col)];
        let qk = matrix[(q, col)];
        matrix[(p, col)] = c * pk - s * qk;
        matrix[(q, col)] = s * pk + c * qk;
    }
}
