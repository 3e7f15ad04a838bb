//! Pohlhausen quartic velocity profile and its link to Thwaites' method.
//!
//! The profile family is `u/U = F(η) + Λ·G(η)` with `η = y/δ` and
//!
//! ```text
//! F(η) = 2η - 2η³ + η⁴
//! G(η) = η(1 - η)³ / 6
//! ```
//!
//! Integrating the profile gives the thickness ratios δ₂/δ and δ₁/δ as
//! polynomials in Λ. Thwaites' method produces `λ = δ₂²·dU/ds`, which equals
//! `Λ·(δ₂/δ)²`; [`shape_factor`] inverts that relation to recover Λ.
//!
//! Physical profiles exist for Λ in [-12, 12]. At Λ = -12 the wall shear
//! vanishes (separation); Λ = 12 is the maximum of `Λ·(δ₂/δ)²`, so larger
//! Thwaites values are clipped there.

/// Lower bound of the physical profile family: zero wall shear.
pub const SHAPE_FACTOR_MIN: f64 = -12.0;
/// Upper bound of the physical profile family.
pub const SHAPE_FACTOR_MAX: f64 = 12.0;

/// Velocity ratio u/U at wall distance `eta = y/δ`.
pub fn profile(eta: f64, shape_factor: f64) -> f64 {
    if eta <= 0.0 {
        return 0.0;
    }
    if eta >= 1.0 {
        return 1.0;
    }
    let f = 2.0 * eta - 2.0 * eta.powi(3) + eta.powi(4);
    let g = eta * (1.0 - eta).powi(3) / 6.0;
    f + shape_factor * g
}

/// δ₂/δ for the profile with the given shape factor.
pub fn momentum_ratio(shape_factor: f64) -> f64 {
    37.0 / 315.0 - shape_factor / 945.0 - shape_factor * shape_factor / 9072.0
}

/// δ₁/δ for the profile with the given shape factor.
pub fn displacement_ratio(shape_factor: f64) -> f64 {
    3.0 / 10.0 - shape_factor / 120.0
}

/// Non-dimensional wall shear `d(u/U)/dη` at the wall.
pub fn wall_shear(shape_factor: f64) -> f64 {
    2.0 + shape_factor / 6.0
}

/// Thwaites correlation variable `Λ·(δ₂/δ)²` of a Pohlhausen profile.
pub fn thwaites_variable(shape_factor: f64) -> f64 {
    let ratio = momentum_ratio(shape_factor);
    shape_factor * ratio * ratio
}

fn thwaites_variable_slope(shape_factor: f64) -> f64 {
    let ratio = momentum_ratio(shape_factor);
    let ratio_slope = -1.0 / 945.0 - shape_factor / 4536.0;
    ratio * ratio + 2.0 * shape_factor * ratio * ratio_slope
}

/// Recovers the Pohlhausen shape factor Λ from the Thwaites variable.
///
/// Inside the physical range the closure is monotonic and is inverted by
/// bisection. Values above the range clip to [`SHAPE_FACTOR_MAX`]. Values
/// below it have no profile; they continue along the closure's tangent at
/// [`SHAPE_FACTOR_MIN`] so a separation crossing can still be located
/// between two stations. Non-finite input yields NaN.
pub fn shape_factor(thwaites: f64, tolerance: f64, max_iterations: usize) -> f64 {
    if !thwaites.is_finite() {
        return f64::NAN;
    }

    let upper = thwaites_variable(SHAPE_FACTOR_MAX);
    if thwaites >= upper {
        return SHAPE_FACTOR_MAX;
    }

    let lower = thwaites_variable(SHAPE_FACTOR_MIN);
    if thwaites < lower {
        return SHAPE_FACTOR_MIN + (thwaites - lower) / thwaites_variable_slope(SHAPE_FACTOR_MIN);
    }

    let mut lo = SHAPE_FACTOR_MIN;
    let mut hi = SHAPE_FACTOR_MAX;
    for _ in 0..max_iterations {
        if hi - lo <= tolerance {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if thwaites_variable(mid) < thwaites {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}
