/// The `bl_core` crate predicts laminar boundary-layer separation on a
/// two-dimensional body from its inviscid surface velocity.
///
/// Key components:
/// - **Thwaites**: momentum-thickness integral, shape factor and the one-way
///   separation latch (`solve_thwaites`).
/// - **Pohlhausen**: the quartic profile family and the nonlinear closure that
///   maps the Thwaites variable onto the shape factor.
/// - **Interpolation**: fractional-index lookup used to place separation
///   between stations.
/// - **Geometry**: splits a solved panel surface at its stagnation point into
///   two boundary-layer branches.
pub mod error;
pub mod geometry;
pub mod interpolation;
pub mod numerics;
pub mod pohlhausen;
pub mod thwaites;
pub mod traits;

pub use error::{BoundaryLayerError, BoundaryLayerResult};
pub use interpolation::interpolate_at;
pub use thwaites::{
    locate_separation, solve_thwaites, thwaites, BoundaryLayerProfile, BoundaryLayerSolution,
    BoundaryLayerState, StationState, StationValues, ThwaitesSettings,
};
