//! Ordinary least-squares fitting of affine functions.

use ndarray::{Array1, Array2};

use crate::data::Point;
use crate::repr::AffineFunction;

/// Relative pivot size below which the normal matrix counts as singular.
const SINGULAR_RTOL: f64 = 1e-10;

/// Number of times the ridge term is grown before giving up.
const MAX_RIDGE_ATTEMPTS: usize = 6;

/// Fit `y ≈ w · x + b` by least squares.
///
/// Works on mean-centred data: the weights solve the centred normal
/// equations by Cholesky factorisation and the constant is recovered as
/// `mean(y) - w · mean(x)`. When the centred normal matrix is singular
/// (collinear or constant features, fewer samples than features) a ridge
/// term `ridge * max(1, trace / n)` is added to its diagonal and grown
/// tenfold until the factorisation succeeds.
///
/// Returns `None` for an empty sample or when every attempt fails.
pub fn least_squares(samples: &[(&Point, f32)], n_features: usize, ridge: f64) -> Option<AffineFunction> {
    let m = samples.len();
    if m == 0 {
        return None;
    }

    let mut x_mean = Array1::<f64>::zeros(n_features);
    let mut y_mean = 0.0f64;
    for (x, y) in samples {
        for (acc, &v) in x_mean.iter_mut().zip(x.iter()) {
            *acc += f64::from(v);
        }
        y_mean += f64::from(*y);
    }
    x_mean /= m as f64;
    y_mean /= m as f64;

    if n_features == 0 {
        return Some(AffineFunction::constant(0, y_mean as f32));
    }

    let mut xtx = Array2::<f64>::zeros((n_features, n_features));
    let mut xty = Array1::<f64>::zeros(n_features);
    let mut row = Array1::<f64>::zeros(n_features);
    for (x, y) in samples {
        for (k, r) in row.iter_mut().enumerate() {
            *r = f64::from(x[k]) - x_mean[k];
        }
        let yc = f64::from(*y) - y_mean;
        for i in 0..n_features {
            let ri = row[i];
            if ri == 0.0 {
                continue;
            }
            xty[i] += ri * yc;
            for j in 0..=i {
                xtx[[i, j]] += ri * row[j];
            }
        }
    }
    for i in 0..n_features {
        for j in 0..i {
            xtx[[j, i]] = xtx[[i, j]];
        }
    }

    let weights = match cholesky_solve(&xtx, &xty) {
        Some(w) => w,
        None => {
            let trace: f64 = xtx.diag().sum();
            let mut lambda = ridge * (trace / n_features as f64).max(1.0);
            let mut solved = None;
            for _ in 0..MAX_RIDGE_ATTEMPTS {
                let mut regularized = xtx.clone();
                regularized.diag_mut().mapv_inplace(|d| d + lambda);
                if let Some(w) = cholesky_solve(&regularized, &xty) {
                    solved = Some(w);
                    break;
                }
                lambda *= 10.0;
            }
            solved?
        }
    };

    let constant = y_mean - weights.dot(&x_mean);
    let w: Vec<f32> = weights.iter().map(|&v| v as f32).collect();
    let f = AffineFunction::from_parts(&w, constant as f32);
    f.is_finite().then_some(f)
}

/// Solve `A x = b` for symmetric positive definite `A`.
///
/// Returns `None` when a pivot is not clearly positive.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let max_diag = a.diag().iter().fold(0.0f64, |acc, &d| acc.max(d.abs()));
    let tol = SINGULAR_RTOL * max_diag.max(f64::MIN_POSITIVE);

    // A = L * L^T
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[j, j]] - sum;
                if diag <= tol {
                    return None;
                }
                l[[j, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }
    Some(x)
}
