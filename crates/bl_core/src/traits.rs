use nalgebra::Point2;
use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be carried along a boundary-layer branch.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A solved potential-flow surface (e.g. the output of a vortex panel method).
///
/// Panels are ordered around the closed body contour. The tangential surface
/// velocity of panel `i`, measured along increasing panel index, is `-strength(i)`.
pub trait SurfaceSolution {
    /// Returns the number of panels on the contour.
    fn panel_count(&self) -> usize;

    /// Control point of the panel, where velocity is evaluated.
    fn midpoint(&self, index: usize) -> Point2<f64>;

    /// Vortex sheet strength γ of the panel.
    fn strength(&self, index: usize) -> f64;

    /// Tangential velocity along increasing panel index.
    fn tangential_velocity(&self, index: usize) -> f64 {
        -self.strength(index)
    }
}
