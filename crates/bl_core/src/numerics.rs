//! Discrete calculus on a station grid.
//!
//! Both routines take samples `f` at strictly increasing stations `s` and
//! assume the caller has already checked that the slices have equal length.

/// Running trapezoidal-rule integral of `f` over `s`, starting from zero.
///
/// Entry `i` only depends on samples `0..=i`.
pub fn cumulative_trapezoid(f: &[f64], s: &[f64]) -> Vec<f64> {
    let n = f.len().min(s.len());
    let mut out = Vec::with_capacity(n);
    if n == 0 {
        return out;
    }

    let mut total = 0.0;
    out.push(total);
    for i in 1..n {
        total += 0.5 * (f[i] + f[i - 1]) * (s[i] - s[i - 1]);
        out.push(total);
    }
    out
}

/// First derivative of `f` with respect to `s`.
///
/// Second-order central differences on the (possibly non-uniform) interior,
/// first-order one-sided differences at both ends. Needs at least two samples.
pub fn gradient(f: &[f64], s: &[f64]) -> Vec<f64> {
    let n = f.len().min(s.len());
    if n < 2 {
        return vec![0.0; n];
    }

    let mut out = vec![0.0; n];
    out[0] = (f[1] - f[0]) / (s[1] - s[0]);
    out[n - 1] = (f[n - 1] - f[n - 2]) / (s[n - 1] - s[n - 2]);

    for i in 1..n - 1 {
        let h0 = s[i] - s[i - 1];
        let h1 = s[i + 1] - s[i];
        out[i] = (h0 * h0 * f[i + 1] + (h1 * h1 - h0 * h0) * f[i] - h1 * h1 * f[i - 1])
            / (h0 * h1 * (h0 + h1));
    }
    out
}
