//! Glue between a solved panel surface and the boundary-layer engine.
//!
//! A closed body has an attachment stagnation point where the tangential
//! velocity changes from negative to positive along the panel order (flow
//! diverges there). Two boundary layers grow away from it: one following the
//! panel order, one running against it. Each branch is turned into a
//! [`BoundaryLayerProfile`] that starts at the stagnation point with zero
//! velocity.

use crate::interpolation::interpolate_at;
use crate::thwaites::{
    solve_thwaites, BoundaryLayerProfile, BoundaryLayerSolution, ThwaitesSettings,
};
use crate::traits::SurfaceSolution;
use anyhow::{bail, Context, Result};
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A closed polygonal body with one vortex strength per panel.
///
/// Panel `i` joins vertex `i` to vertex `(i + 1) % n`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawPanelSurface")]
pub struct PanelSurface {
    vertices: Vec<Point2<f64>>,
    strengths: Vec<f64>,
}

#[derive(Deserialize)]
struct RawPanelSurface {
    vertices: Vec<Point2<f64>>,
    strengths: Vec<f64>,
}

impl TryFrom<RawPanelSurface> for PanelSurface {
    type Error = anyhow::Error;

    fn try_from(raw: RawPanelSurface) -> Result<Self> {
        Self::new(raw.vertices, raw.strengths)
    }
}

impl PanelSurface {
    pub fn new(vertices: Vec<Point2<f64>>, strengths: Vec<f64>) -> Result<Self> {
        if vertices.len() < 3 {
            bail!(
                "A closed surface needs at least 3 panels, got {}.",
                vertices.len()
            );
        }
        if vertices.len() != strengths.len() {
            bail!(
                "Panel count mismatch: {} vertices but {} strengths.",
                vertices.len(),
                strengths.len()
            );
        }
        if vertices.iter().any(|v| !(v.x.is_finite() && v.y.is_finite())) {
            bail!("Panel vertices must be finite.");
        }
        if strengths.iter().any(|g| !g.is_finite()) {
            bail!("Panel strengths must be finite.");
        }
        Ok(Self {
            vertices,
            strengths,
        })
    }

    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    /// Length of panel `index`.
    pub fn panel_length(&self, index: usize) -> f64 {
        let next = (index + 1) % self.vertices.len();
        (self.vertices[next] - self.vertices[index]).norm()
    }
}

impl SurfaceSolution for PanelSurface {
    fn panel_count(&self) -> usize {
        self.strengths.len()
    }

    fn midpoint(&self, index: usize) -> Point2<f64> {
        let next = (index + 1) % self.vertices.len();
        nalgebra::center(&self.vertices[index], &self.vertices[next])
    }

    fn strength(&self, index: usize) -> f64 {
        self.strengths[index]
    }
}

/// Direction a branch travels relative to the panel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchSide {
    Forward,
    Backward,
}

/// One boundary-layer branch, from the stagnation point downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryLayerBranch {
    pub side: BranchSide,
    /// Station positions; the first entry is the stagnation point.
    pub points: Vec<Point2<f64>>,
    pub profile: BoundaryLayerProfile,
}

impl BoundaryLayerBranch {
    fn build(side: BranchSide, points: Vec<Point2<f64>>, velocity: Vec<f64>) -> Result<Self> {
        let mut s = Vec::with_capacity(points.len());
        let mut total = 0.0;
        s.push(total);
        for pair in points.windows(2) {
            total += (pair[1] - pair[0]).norm();
            s.push(total);
        }
        let profile = BoundaryLayerProfile::new(s, velocity)
            .with_context(|| format!("Failed to build {:?} boundary-layer branch", side))?;
        Ok(Self {
            side,
            points,
            profile,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchSolution {
    pub branch: BoundaryLayerBranch,
    pub solution: BoundaryLayerSolution,
    pub separation_point: Option<Point2<f64>>,
}

/// Splits a solved surface at its attachment stagnation point.
///
/// Returns the `Forward` branch first, then the `Backward` branch.
pub fn split_at_stagnation(surface: &impl SurfaceSolution) -> Result<[BoundaryLayerBranch; 2]> {
    let n = surface.panel_count();
    if n < 3 {
        bail!("A closed surface needs at least 3 panels, got {}.", n);
    }
    let velocity: Vec<f64> = (0..n).map(|i| surface.tangential_velocity(i)).collect();

    let diverging: Vec<usize> = (0..n)
        .filter(|&b| velocity[(b + n - 1) % n] <= 0.0 && velocity[b] > 0.0)
        .collect();
    let Some(&next) = diverging.first() else {
        bail!("No stagnation point found: tangential velocity never changes sign.");
    };
    if diverging.len() > 1 {
        warn!(
            "{} attachment stagnation points found; using the one before panel {}",
            diverging.len(),
            next
        );
    }
    let prev = (next + n - 1) % n;

    let weight = velocity[prev] / (velocity[prev] - velocity[next]);
    let a = surface.midpoint(prev);
    let b = surface.midpoint(next);
    let stagnation = a + (b - a) * weight;

    let walk = |start: usize, forward: bool| {
        let sign = if forward { 1.0 } else { -1.0 };
        let mut points = vec![stagnation];
        let mut speeds = vec![0.0];
        let mut i = start;
        for step in 0..n {
            let u = sign * velocity[i];
            if u > 0.0 {
                points.push(surface.midpoint(i));
                speeds.push(u);
            } else if !(step == 0 && u == 0.0) {
                // a panel sitting exactly on the stagnation point is skipped
                break;
            }
            i = if forward { (i + 1) % n } else { (i + n - 1) % n };
        }
        (points, speeds)
    };

    let (forward_points, forward_speeds) = walk(next, true);
    let (backward_points, backward_speeds) = walk(prev, false);
    debug!(
        "stagnation between panels {} and {}: {} forward and {} backward stations",
        prev,
        next,
        forward_points.len(),
        backward_points.len()
    );

    Ok([
        BoundaryLayerBranch::build(BranchSide::Forward, forward_points, forward_speeds)?,
        BoundaryLayerBranch::build(BranchSide::Backward, backward_points, backward_speeds)?,
    ])
}

/// Position of separation along a branch, if the boundary layer separates.
pub fn separation_point(
    branch: &BoundaryLayerBranch,
    solution: &BoundaryLayerSolution,
) -> Result<Option<Point2<f64>>> {
    let Some(index) = solution.separation_index() else {
        return Ok(None);
    };
    let xs: Vec<f64> = branch.points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = branch.points.iter().map(|p| p.y).collect();
    let x = interpolate_at(&xs, index).context("Separation index outside branch")?;
    let y = interpolate_at(&ys, index).context("Separation index outside branch")?;
    Ok(Some(Point2::new(x, y)))
}

/// Splits the surface and solves both boundary layers.
pub fn solve_branches(
    surface: &impl SurfaceSolution,
    settings: ThwaitesSettings,
) -> Result<Vec<BranchSolution>> {
    split_at_stagnation(surface)?
        .into_iter()
        .map(|branch| {
            let solution = solve_thwaites(&branch.profile, settings)
                .with_context(|| format!("Thwaites solve failed on {:?} branch", branch.side))?;
            let point = separation_point(&branch, &solution)?;
            Ok(BranchSolution {
                branch,
                solution,
                separation_point: point,
            })
        })
        .collect()
}
