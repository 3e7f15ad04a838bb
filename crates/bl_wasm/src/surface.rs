//! Whole-surface entry point: split a panel solution and solve both branches.

use crate::branch::parse_settings;
use bl_core::geometry::{solve_branches, BranchSide, PanelSurface};
use bl_core::ThwaitesSettings;
use nalgebra::Point2;
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BranchPayload {
    side: BranchSide,
    x: Vec<f64>,
    y: Vec<f64>,
    arc_length: Vec<f64>,
    velocity: Vec<f64>,
    momentum_thickness: Vec<f64>,
    shape_factor: Vec<f64>,
    separation_index: Option<f64>,
    separation_point: Option<[f64; 2]>,
}

pub(crate) fn solve_surface_payload(
    xs: &[f64],
    ys: &[f64],
    strengths: Vec<f64>,
    settings: ThwaitesSettings,
) -> Result<Vec<BranchPayload>, String> {
    if xs.len() != ys.len() {
        return Err(format!(
            "Coordinate length mismatch: {} x values but {} y values",
            xs.len(),
            ys.len()
        ));
    }
    let vertices = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| Point2::new(x, y))
        .collect();
    let surface = PanelSurface::new(vertices, strengths).map_err(|e| format!("{e:#}"))?;
    let results = solve_branches(&surface, settings).map_err(|e| format!("{e:#}"))?;

    Ok(results
        .into_iter()
        .map(|result| BranchPayload {
            side: result.branch.side,
            x: result.branch.points.iter().map(|p| p.x).collect(),
            y: result.branch.points.iter().map(|p| p.y).collect(),
            arc_length: result.branch.profile.arc_length().to_vec(),
            velocity: result.branch.profile.velocity().to_vec(),
            momentum_thickness: result.solution.momentum_thickness(),
            shape_factor: result.solution.shape_factor(),
            separation_index: result.solution.separation_index(),
            separation_point: result.separation_point.map(|p| [p.x, p.y]),
        })
        .collect())
}

/// Solves the boundary layers on both sides of a closed panel surface.
///
/// `xs`/`ys` are the panel vertices in order, `strengths` the vortex strength
/// of each panel. Returns an array of two branch objects.
#[wasm_bindgen]
pub fn solve_surface(
    xs: Vec<f64>,
    ys: Vec<f64>,
    strengths: Vec<f64>,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let settings = parse_settings(settings)?;
    let payload = solve_surface_payload(&xs, &ys, strengths, settings)
        .map_err(|e| JsValue::from_str(&format!("Surface solve failed: {}", e)))?;
    to_value(&payload).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
