//! Thwaites' integral method for a laminar boundary layer.
//!
//! Along one branch running from a stagnation point, the scaled momentum
//! thickness follows from the closed-form integral
//!
//! ```text
//! δ₂²(s) = K / u_s(s)⁶ · ∫₀ˢ u_s⁵ ds        (K = 0.45)
//! ```
//!
//! The Thwaites variable `λ = δ₂²·du_s/ds` is mapped onto the Pohlhausen
//! shape factor Λ, and the first station where Λ drops below the separation
//! threshold ends the attached region. Everything downstream is reported as
//! [`StationState::Separated`].

use crate::error::{BoundaryLayerError, BoundaryLayerResult};
use crate::interpolation::interpolate_at;
use crate::numerics::{cumulative_trapezoid, gradient};
use crate::pohlhausen::{self, SHAPE_FACTOR_MAX};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThwaitesSettings {
    /// Constant K of the momentum-thickness integral.
    pub thwaites_constant: f64,
    /// Shape factor below which the profile has reversed at the wall.
    pub separation_threshold: f64,
    pub closure_tolerance: f64,
    pub max_closure_iterations: usize,
}

impl Default for ThwaitesSettings {
    fn default() -> Self {
        Self {
            thwaites_constant: 0.45,
            separation_threshold: pohlhausen::SHAPE_FACTOR_MIN,
            closure_tolerance: 1e-12,
            max_closure_iterations: 200,
        }
    }
}

impl ThwaitesSettings {
    pub fn validate(&self) -> BoundaryLayerResult<()> {
        if !(self.thwaites_constant.is_finite() && self.thwaites_constant > 0.0) {
            return Err(BoundaryLayerError::InvalidSettings(
                "thwaites_constant must be positive and finite".to_string(),
            ));
        }
        if !(self.separation_threshold.is_finite() && self.separation_threshold < SHAPE_FACTOR_MAX)
        {
            return Err(BoundaryLayerError::InvalidSettings(format!(
                "separation_threshold must be finite and below {SHAPE_FACTOR_MAX}"
            )));
        }
        if !(self.closure_tolerance.is_finite() && self.closure_tolerance > 0.0) {
            return Err(BoundaryLayerError::InvalidSettings(
                "closure_tolerance must be positive".to_string(),
            ));
        }
        if self.max_closure_iterations == 0 {
            return Err(BoundaryLayerError::InvalidSettings(
                "max_closure_iterations must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Arc-length stations and external velocity of one boundary-layer branch.
///
/// The two sequences are validated together and cannot be modified
/// independently afterwards. Deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProfile")]
pub struct BoundaryLayerProfile {
    s: Vec<f64>,
    u_s: Vec<f64>,
}

#[derive(Deserialize)]
struct RawProfile {
    s: Vec<f64>,
    u_s: Vec<f64>,
}

impl TryFrom<RawProfile> for BoundaryLayerProfile {
    type Error = BoundaryLayerError;

    fn try_from(raw: RawProfile) -> BoundaryLayerResult<Self> {
        Self::new(raw.s, raw.u_s)
    }
}

impl BoundaryLayerProfile {
    pub fn new(s: Vec<f64>, u_s: Vec<f64>) -> BoundaryLayerResult<Self> {
        if s.len() != u_s.len() {
            return Err(BoundaryLayerError::InvalidInput(format!(
                "station and velocity lengths differ ({} vs {})",
                s.len(),
                u_s.len()
            )));
        }
        if s.len() < 2 {
            return Err(BoundaryLayerError::InvalidInput(format!(
                "at least 2 stations are required, got {}",
                s.len()
            )));
        }
        if let Some(i) = (1..s.len()).find(|&i| !(s[i] > s[i - 1]) || !s[i].is_finite()) {
            return Err(BoundaryLayerError::InvalidInput(format!(
                "stations must be strictly increasing (s[{}] = {}, s[{}] = {})",
                i - 1,
                s[i - 1],
                i,
                s[i]
            )));
        }
        if !s[0].is_finite() {
            return Err(BoundaryLayerError::InvalidInput(
                "stations must be finite".to_string(),
            ));
        }
        Ok(Self { s, u_s })
    }

    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    pub fn arc_length(&self) -> &[f64] {
        &self.s
    }

    pub fn velocity(&self) -> &[f64] {
        &self.u_s
    }
}

/// Boundary-layer quantities at an attached station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationValues {
    /// Scaled momentum thickness δ₂·√(U/νL).
    pub momentum_thickness: f64,
    /// Thwaites variable δ₂²·du_s/ds.
    pub thwaites_parameter: f64,
    /// Pohlhausen shape factor Λ.
    pub shape_factor: f64,
    pub velocity_gradient: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "values")]
pub enum StationState {
    Attached(StationValues),
    Separated,
}

impl StationState {
    pub fn values(&self) -> Option<&StationValues> {
        match self {
            StationState::Attached(values) => Some(values),
            StationState::Separated => None,
        }
    }

    pub fn is_separated(&self) -> bool {
        matches!(self, StationState::Separated)
    }
}

/// One-way latch of the downstream scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryLayerState {
    Attached,
    Separated,
}

impl BoundaryLayerState {
    /// Advances the latch by one station. Once separated, always separated.
    pub fn advance(self, shape_factor: f64, threshold: f64) -> Self {
        match self {
            BoundaryLayerState::Separated => BoundaryLayerState::Separated,
            BoundaryLayerState::Attached if shape_factor < threshold => {
                BoundaryLayerState::Separated
            }
            BoundaryLayerState::Attached => BoundaryLayerState::Attached,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryLayerSolution {
    pub stations: Vec<StationState>,
    /// Fractional station index of separation, `None` if the flow stays attached.
    pub separation_index: Option<f64>,
}

impl BoundaryLayerSolution {
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn separation_index(&self) -> Option<f64> {
        self.separation_index
    }

    pub fn is_separated(&self) -> bool {
        self.separation_index.is_some()
    }

    pub fn state_at(&self, index: usize) -> Option<StationState> {
        self.stations.get(index).copied()
    }

    fn collect(&self, field: impl Fn(&StationValues) -> f64) -> Vec<f64> {
        self.stations
            .iter()
            .map(|station| station.values().map_or(0.0, &field))
            .collect()
    }

    /// Scaled momentum thickness per station; zero past separation.
    pub fn momentum_thickness(&self) -> Vec<f64> {
        self.collect(|v| v.momentum_thickness)
    }

    /// Pohlhausen shape factor per station; zero past separation.
    pub fn shape_factor(&self) -> Vec<f64> {
        self.collect(|v| v.shape_factor)
    }

    pub fn thwaites_parameter(&self) -> Vec<f64> {
        self.collect(|v| v.thwaites_parameter)
    }

    pub fn velocity_gradient(&self) -> Vec<f64> {
        self.collect(|v| v.velocity_gradient)
    }

    /// Scaled boundary-layer thickness δ = δ₂ / (δ₂/δ).
    pub fn boundary_layer_thickness(&self) -> Vec<f64> {
        self.collect(|v| v.momentum_thickness / pohlhausen::momentum_ratio(v.shape_factor))
    }

    /// Scaled displacement thickness δ₁.
    pub fn displacement_thickness(&self) -> Vec<f64> {
        self.collect(|v| {
            v.momentum_thickness * pohlhausen::displacement_ratio(v.shape_factor)
                / pohlhausen::momentum_ratio(v.shape_factor)
        })
    }

    /// Scaled wall shear (∂u/∂y at the wall, in the δ₂·√(U/νL) scaling).
    ///
    /// Infinite at a station with zero momentum thickness.
    pub fn wall_shear(&self) -> Vec<f64> {
        self.collect(|v| {
            let thickness = v.momentum_thickness / pohlhausen::momentum_ratio(v.shape_factor);
            pohlhausen::wall_shear(v.shape_factor) / thickness
        })
    }

    /// Momentum thickness relative to the reference length at Reynolds number `UL/ν`.
    pub fn dimensional_momentum_thickness(&self, reynolds: f64) -> BoundaryLayerResult<Vec<f64>> {
        if !(reynolds.is_finite() && reynolds > 0.0) {
            return Err(BoundaryLayerError::InvalidInput(format!(
                "Reynolds number must be positive, got {reynolds}"
            )));
        }
        let scale = reynolds.sqrt().recip();
        Ok(self.collect(|v| v.momentum_thickness * scale))
    }

    /// Arc length at the separation point, if any.
    pub fn separation_location(
        &self,
        profile: &BoundaryLayerProfile,
    ) -> BoundaryLayerResult<Option<f64>> {
        match self.separation_index {
            Some(index) => interpolate_at(profile.arc_length(), index).map(Some),
            None => Ok(None),
        }
    }
}

/// Finds the fractional index where the shape factor first drops below `threshold`.
///
/// Between the last attached station `k - 1` and the first separated station
/// `k` the crossing is placed by linear interpolation. A profile that starts
/// below the threshold separates at index 0. When station `k - 1` is
/// singular there is nothing to interpolate from and separation is placed at
/// station `k`.
pub fn locate_separation(shape_factor: &[f64], threshold: f64) -> Option<f64> {
    let k = shape_factor.iter().position(|&lam| lam < threshold)?;
    if k == 0 {
        return Some(0.0);
    }
    let above = shape_factor[k - 1];
    let below = shape_factor[k];
    let weight = (above - threshold) / (above - below);
    if weight.is_finite() {
        Some((k - 1) as f64 + weight)
    } else {
        Some(k as f64)
    }
}

/// Momentum thickness from the Thwaites integral, with the stagnation limit at s = 0.
fn momentum_thickness(
    profile: &BoundaryLayerProfile,
    velocity_gradient: &[f64],
    constant: f64,
) -> Vec<f64> {
    let u = profile.velocity();
    let u5: Vec<f64> = u.iter().map(|v| v.powi(5)).collect();
    let integral = cumulative_trapezoid(&u5, profile.arc_length());

    u.iter()
        .zip(integral.iter())
        .enumerate()
        .map(|(i, (&u_i, &int_i))| {
            if i == 0 && u_i == 0.0 {
                // u ≈ a·s near stagnation, so δ₂² → K / (6a)
                (constant / (6.0 * velocity_gradient[0])).sqrt()
            } else {
                (constant / u_i.powi(6) * int_i).sqrt()
            }
        })
        .collect()
}

pub fn solve_thwaites(
    profile: &BoundaryLayerProfile,
    settings: ThwaitesSettings,
) -> BoundaryLayerResult<BoundaryLayerSolution> {
    settings.validate()?;

    let velocity_gradient = gradient(profile.velocity(), profile.arc_length());
    let delta2 = momentum_thickness(profile, &velocity_gradient, settings.thwaites_constant);

    let singular = delta2.iter().skip(1).filter(|d| !d.is_finite()).count();
    if singular > 0 {
        warn!(
            "{} of {} stations have a singular external velocity",
            singular,
            profile.len()
        );
    }

    let thwaites: Vec<f64> = delta2
        .iter()
        .zip(velocity_gradient.iter())
        .map(|(d, du)| du * d * d)
        .collect();
    let shape_factor: Vec<f64> = thwaites
        .iter()
        .map(|&t| {
            pohlhausen::shape_factor(
                t,
                settings.closure_tolerance,
                settings.max_closure_iterations,
            )
        })
        .collect();

    let separation_index = locate_separation(&shape_factor, settings.separation_threshold);

    let mut state = BoundaryLayerState::Attached;
    let stations = (0..profile.len())
        .map(|i| {
            state = state.advance(shape_factor[i], settings.separation_threshold);
            match state {
                BoundaryLayerState::Attached => StationState::Attached(StationValues {
                    momentum_thickness: delta2[i],
                    thwaites_parameter: thwaites[i],
                    shape_factor: shape_factor[i],
                    velocity_gradient: velocity_gradient[i],
                }),
                BoundaryLayerState::Separated => StationState::Separated,
            }
        })
        .collect();

    match separation_index {
        Some(index) => debug!(
            "boundary layer separates at station {:.4} of {}",
            index,
            profile.len()
        ),
        None => debug!("boundary layer attached over all {} stations", profile.len()),
    }

    Ok(BoundaryLayerSolution {
        stations,
        separation_index,
    })
}

/// Solves one branch with default settings.
pub fn thwaites(s: &[f64], u_s: &[f64]) -> BoundaryLayerResult<BoundaryLayerSolution> {
    let profile = BoundaryLayerProfile::new(s.to_vec(), u_s.to_vec())?;
    solve_thwaites(&profile, ThwaitesSettings::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect()
    }

    fn assert_err_contains<T: std::fmt::Debug>(result: BoundaryLayerResult<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn profile_rejects_invalid_inputs() {
        assert_err_contains(
            BoundaryLayerProfile::new(vec![0.0, 1.0], vec![1.0]),
            "lengths differ",
        );
        assert_err_contains(
            BoundaryLayerProfile::new(vec![0.0], vec![1.0]),
            "at least 2 stations",
        );
        assert_err_contains(
            BoundaryLayerProfile::new(vec![0.0, 1.0, 1.0], vec![1.0; 3]),
            "strictly increasing",
        );
        assert_err_contains(
            BoundaryLayerProfile::new(vec![0.0, 2.0, 1.0], vec![1.0; 3]),
            "strictly increasing",
        );
        assert_err_contains(
            BoundaryLayerProfile::new(vec![0.0, f64::NAN], vec![1.0; 2]),
            "strictly increasing",
        );
        assert_err_contains(
            BoundaryLayerProfile::new(vec![0.0, f64::INFINITY], vec![1.0; 2]),
            "strictly increasing",
        );
    }

    #[test]
    fn settings_are_validated() {
        let s = linspace(0.0, 1.0, 4);
        let profile = BoundaryLayerProfile::new(s, vec![1.0; 4]).unwrap();

        let settings = ThwaitesSettings {
            thwaites_constant: 0.0,
            ..ThwaitesSettings::default()
        };
        assert_err_contains(solve_thwaites(&profile, settings), "thwaites_constant");

        let settings = ThwaitesSettings {
            separation_threshold: 12.0,
            ..ThwaitesSettings::default()
        };
        assert_err_contains(solve_thwaites(&profile, settings), "separation_threshold");

        let settings = ThwaitesSettings {
            max_closure_iterations: 0,
            ..ThwaitesSettings::default()
        };
        assert_err_contains(solve_thwaites(&profile, settings), "max_closure_iterations");
    }

    #[test]
    fn flat_plate_matches_blasius_growth() {
        let s = linspace(0.0, 1.0, 32);
        let solution = thwaites(&s, &vec![1.0; 32]).unwrap();
        let delta2 = solution.momentum_thickness();

        assert_eq!(delta2[0], 0.0);
        for i in 1..s.len() {
            let exact = 0.685 * s[i].sqrt();
            assert!(
                ((delta2[i] - exact) / exact).abs() < 0.05,
                "station {i}: {} vs {exact}",
                delta2[i]
            );
        }
        assert!(solution.separation_index().is_none());
        assert!(solution.shape_factor().iter().all(|&lam| lam.abs() < 1e-9));
    }

    #[test]
    fn stagnation_point_uses_the_closed_form_limit() {
        let s = linspace(0.0, 0.5, 11);
        let u: Vec<f64> = s.iter().map(|x| 2.0 * x).collect();
        let solution = thwaites(&s, &u).unwrap();
        let first = solution.state_at(0).unwrap();
        let values = first.values().expect("stagnation point is attached");

        assert!((values.momentum_thickness - (0.075_f64 / 2.0).sqrt()).abs() < 1e-12);
        assert!((values.thwaites_parameter - 0.075).abs() < 1e-12);
        assert!(values.shape_factor > 0.0 && values.shape_factor < 12.0);

        // Linear velocity keeps δ₂ constant; the trapezoid rule converges on it downstream.
        let last = solution.momentum_thickness()[10];
        let exact = 0.0375_f64.sqrt();
        assert!(((last - exact) / exact).abs() < 0.03);
    }

    #[test]
    fn cylinder_separates_near_108_degrees() {
        let s = linspace(0.0, PI, 32);
        let u: Vec<f64> = s.iter().map(|x| 2.0 * x.sin()).collect();
        let profile = BoundaryLayerProfile::new(s, u).unwrap();
        let solution = solve_thwaites(&profile, ThwaitesSettings::default()).unwrap();

        let location = solution
            .separation_location(&profile)
            .unwrap()
            .expect("cylinder flow should separate");
        assert!(((location - 1.88) / 1.88).abs() < 0.01, "separated at {location}");

        let index = solution.separation_index().unwrap();
        let first_zeroed = index.ceil() as usize;
        for j in first_zeroed..solution.len() {
            assert!(solution.stations[j].is_separated());
        }
        assert!(solution.momentum_thickness()[first_zeroed..]
            .iter()
            .all(|&d| d == 0.0));
        assert!(solution.shape_factor()[first_zeroed..]
            .iter()
            .all(|&lam| lam == 0.0));
        assert!(solution.shape_factor()[..first_zeroed]
            .iter()
            .all(|&lam| lam >= -12.0));
    }

    #[test]
    fn zero_velocity_downstream_is_reported_not_raised() {
        let s = linspace(0.0, 1.0, 6);
        let u = vec![1.0, 1.0, 1.0, 0.0, 1.0, 1.0];
        let profile = BoundaryLayerProfile::new(s, u).unwrap();
        // Keep the dip upstream of the singular station attached.
        let settings = ThwaitesSettings {
            separation_threshold: -1e9,
            ..ThwaitesSettings::default()
        };
        let solution = solve_thwaites(&profile, settings).unwrap();
        let delta2 = solution.momentum_thickness();

        assert!(delta2[3].is_infinite());
        assert!(solution.shape_factor()[3].is_nan());
        assert!(solution.separation_index().is_none());
        assert!(delta2[..3].iter().all(|d| d.is_finite()));
        assert_eq!(solution.len(), 6);
    }

    #[test]
    fn latch_never_reattaches() {
        let threshold = -12.0;
        let mut state = BoundaryLayerState::Attached;
        let mut trace = Vec::new();
        for lam in [3.0, -5.0, -12.5, 4.0, 8.0] {
            state = state.advance(lam, threshold);
            trace.push(state);
        }
        assert_eq!(
            trace,
            vec![
                BoundaryLayerState::Attached,
                BoundaryLayerState::Attached,
                BoundaryLayerState::Separated,
                BoundaryLayerState::Separated,
                BoundaryLayerState::Separated,
            ]
        );
        assert_eq!(
            BoundaryLayerState::Attached.advance(threshold, threshold),
            BoundaryLayerState::Attached
        );
    }

    #[test]
    fn separation_crossing_is_interpolated_between_stations() {
        let lam = [2.0, -4.0, -11.9, -12.1, -3.0];
        let index = locate_separation(&lam, -12.0).unwrap();
        assert!(index > 2.0 && index < 3.0);
        assert!((index - 2.5).abs() < 1e-9);

        assert_eq!(locate_separation(&[1.0, 2.0, -12.0], -12.0), None);
        assert_eq!(locate_separation(&[-13.0, 1.0], -12.0), Some(0.0));
        assert_eq!(locate_separation(&[], -12.0), None);
    }

    #[test]
    fn singular_station_before_crossing_keeps_index_finite() {
        assert_eq!(locate_separation(&[1.0, f64::NAN, -20.0], -12.0), Some(2.0));
        assert_eq!(
            locate_separation(&[1.0, -5.0, f64::NEG_INFINITY], -12.0),
            Some(1.0)
        );

        // Stagnation at 0, zero velocity at station 2, sharp deceleration at 3.
        let s = vec![0.0, 0.25, 0.5, 0.75, 1.0];
        let u = vec![0.0, 1.0, 0.0, 1.0, -1.0];
        let profile = BoundaryLayerProfile::new(s, u).unwrap();
        let solution = solve_thwaites(&profile, ThwaitesSettings::default()).unwrap();

        assert!(solution.shape_factor()[2].is_nan());
        assert!(!solution.stations[2].is_separated());
        assert!(solution.stations[3].is_separated());
        assert_eq!(solution.separation_index(), Some(3.0));
        assert_eq!(solution.separation_location(&profile).unwrap(), Some(0.75));
    }

    #[test]
    fn deserialized_profile_is_validated() {
        let err = serde_json::from_str::<BoundaryLayerProfile>(
            r#"{"s":[0.0,1.0,2.0],"u_s":[1.0]}"#,
        )
        .expect_err("mismatched lengths");
        assert!(err.to_string().contains("lengths differ"));

        let err = serde_json::from_str::<BoundaryLayerProfile>(
            r#"{"s":[0.0,2.0,1.0],"u_s":[1.0,1.0,1.0]}"#,
        )
        .expect_err("non-increasing stations");
        assert!(err.to_string().contains("strictly increasing"));

        let profile: BoundaryLayerProfile =
            serde_json::from_str(r#"{"s":[0.0,0.5,1.0],"u_s":[1.0,1.0,1.0]}"#).unwrap();
        assert_eq!(profile.len(), 3);
        assert!(solve_thwaites(&profile, ThwaitesSettings::default()).is_ok());
    }

    #[test]
    fn derived_thicknesses_follow_the_closure() {
        let s = linspace(0.0, 1.0, 8);
        let solution = thwaites(&s, &vec![1.0; 8]).unwrap();
        let delta2 = solution.momentum_thickness();
        let delta = solution.boundary_layer_thickness();
        let delta1 = solution.displacement_thickness();

        for i in 1..s.len() {
            assert!((delta[i] - delta2[i] * 315.0 / 37.0).abs() < 1e-12);
            assert!((delta1[i] - 0.3 * delta[i]).abs() < 1e-12);
        }
        assert!(solution.wall_shear()[0].is_infinite());

        let scaled = solution.dimensional_momentum_thickness(1e4).unwrap();
        assert!((scaled[7] - delta2[7] / 100.0).abs() < 1e-15);
        assert_err_contains(solution.dimensional_momentum_thickness(-1.0), "Reynolds");
    }
}
