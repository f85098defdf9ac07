//! Least-squares Zernike fitting via normal equations.

use nalgebra::{DMatrix, DVector};

use crate::heights::HeightField;
use crate::zernike::{mode_set, ZernikeMode};

/// Fitted coefficient vector with its mode alignment.
///
/// `coefficients[i]` weighs `modes[i]`; the two are always the same length.
/// A failed fit (no data, or a singular normal-equation system) is the empty
/// result — terminal for that input, not retryable.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FitResult {
    /// Fitted weights, aligned with `modes`.
    pub coefficients: Vec<f64>,
    /// The mode set the coefficients index into.
    pub modes: Vec<ZernikeMode>,
}

impl FitResult {
    /// True when the fit failed or was never attempted.
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Evaluate the fitted surface at polar coordinates `(rho, theta)`.
    pub fn evaluate(&self, rho: f64, theta: f64) -> f64 {
        self.coefficients
            .iter()
            .zip(&self.modes)
            .map(|(&c, mode)| c * mode.evaluate(rho, theta))
            .sum()
    }
}

/// Fit a weighted Zernike sum to a height field.
///
/// Radii are normalized by the maximum observed value (left unchanged when
/// that maximum is 0); samples falling outside the unit disk after
/// normalization are dropped from the system. The normal equations
/// `(AᵀA)x = Aᵀz` are solved by Gauss-Jordan elimination pivoting on the
/// diagonal; an exactly-zero pivot means the system is singular and yields
/// the empty [`FitResult`].
pub fn fit_zernike(field: &HeightField, max_order: u32) -> FitResult {
    if field.is_empty() {
        return FitResult::default();
    }

    let max_r = field.radii.iter().cloned().fold(0.0f64, f64::max);
    let rho: Vec<f64> = if max_r > 0.0 {
        field.radii.iter().map(|&r| r / max_r).collect()
    } else {
        field.radii.clone()
    };

    let modes = mode_set(max_order);

    // Assemble the design matrix, dropping rho > 1 samples.
    let mut rows: Vec<f64> = Vec::new();
    let mut rhs: Vec<f64> = Vec::new();
    for i in 0..field.len() {
        if rho[i] > 1.0 {
            continue;
        }
        for mode in &modes {
            rows.push(mode.evaluate(rho[i], field.theta[i]));
        }
        rhs.push(field.heights[i]);
    }
    let n_samples = rhs.len();
    if n_samples == 0 {
        return FitResult::default();
    }

    let a = DMatrix::from_row_slice(n_samples, modes.len(), &rows);
    let z = DVector::from_vec(rhs);
    let ata = a.transpose() * &a;
    let atz = a.transpose() * z;

    match solve_gauss_jordan(ata, atz) {
        Some(coefficients) => FitResult {
            coefficients,
            modes,
        },
        None => {
            tracing::warn!(
                n_samples,
                n_modes = modes.len(),
                "normal equations singular; returning empty fit"
            );
            FitResult::default()
        }
    }
}

/// Gauss-Jordan elimination pivoting on the diagonal, no row exchanges.
///
/// Returns `None` on an exactly-zero pivot (singular system). Kept free of
/// partial pivoting so repeated fits over the same input stay
/// bit-reproducible.
fn solve_gauss_jordan(mut a: DMatrix<f64>, mut b: DVector<f64>) -> Option<Vec<f64>> {
    let n = a.nrows();
    debug_assert_eq!(a.ncols(), n);
    debug_assert_eq!(b.len(), n);

    for i in 0..n {
        let pivot = a[(i, i)];
        if pivot == 0.0 {
            return None;
        }
        let inv = 1.0 / pivot;
        for j in i..n {
            a[(i, j)] *= inv;
        }
        b[i] *= inv;

        for k in 0..n {
            if k == i {
                continue;
            }
            let factor = a[(k, i)];
            if factor == 0.0 {
                continue;
            }
            for j in i..n {
                a[(k, j)] -= factor * a[(i, j)];
            }
            b[k] -= factor * b[i];
        }
    }

    Some(b.iter().cloned().collect())
}
