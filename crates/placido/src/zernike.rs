//! Zernike polynomial basis over the unit disk.

/// One Zernike mode: radial order `n`, angular frequency `m`.
///
/// Valid modes satisfy `|m| <= n` with `n - |m|` even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ZernikeMode {
    /// Radial order.
    pub n: u32,
    /// Angular frequency; negative selects the sine harmonic.
    pub m: i32,
}

impl ZernikeMode {
    /// True when `(n, m)` index a real Zernike term.
    pub fn is_valid(self) -> bool {
        let m_abs = self.m.unsigned_abs();
        m_abs <= self.n && (self.n - m_abs) % 2 == 0
    }

    /// Evaluate the normalized polynomial at polar coordinates `(rho, theta)`.
    ///
    /// Returns NaN for `rho > 1` — the term is undefined off the unit disk
    /// and callers decide how to treat such samples. Invalid `(n, m)` pairs
    /// evaluate to 0.
    pub fn evaluate(self, rho: f64, theta: f64) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        if rho > 1.0 {
            return f64::NAN;
        }
        let m_abs = self.m.unsigned_abs();
        let norm = if self.m == 0 {
            ((self.n + 1) as f64).sqrt()
        } else {
            (2.0 * (self.n + 1) as f64).sqrt()
        };
        let angular = if self.m >= 0 {
            (m_abs as f64 * theta).cos()
        } else {
            (m_abs as f64 * theta).sin()
        };
        norm * radial(self.n, m_abs, rho) * angular
    }
}

/// Enumerate all valid modes for radial orders `0..=max_order`.
///
/// Order is deterministic and significant — it defines the coefficient
/// vector's index alignment: ascending `n`, then ascending `m`.
/// `max_order = 6` yields 28 modes.
pub fn mode_set(max_order: u32) -> Vec<ZernikeMode> {
    let mut modes = Vec::new();
    for n in 0..=max_order {
        for m in -(n as i32)..=(n as i32) {
            let mode = ZernikeMode { n, m };
            if mode.is_valid() {
                modes.push(mode);
            }
        }
    }
    modes
}

/// Radial polynomial `R_n^m(rho)` for `m = |m|`.
///
/// Direct summation with iterative factorials; recursion depth is not a
/// concern at any supported order.
fn radial(n: u32, m_abs: u32, rho: f64) -> f64 {
    let upper = (n - m_abs) / 2;
    let mut sum = 0.0;
    for k in 0..=upper {
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        let coeff = sign * factorial(n - k)
            / (factorial(k) * factorial((n + m_abs) / 2 - k) * factorial((n - m_abs) / 2 - k));
        sum += coeff * rho.powi((n - 2 * k) as i32);
    }
    sum
}

fn factorial(n: u32) -> f64 {
    let mut result = 1.0;
    for i in 2..=n {
        result *= i as f64;
    }
    result
}
