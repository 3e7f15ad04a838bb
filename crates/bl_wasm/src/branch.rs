//! Single-branch solver wrapper and the interpolation primitive.

use bl_core::{
    interpolate_at as core_interpolate_at, solve_thwaites, BoundaryLayerProfile,
    BoundaryLayerSolution, ThwaitesSettings,
};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub(crate) fn parse_settings(settings: JsValue) -> Result<ThwaitesSettings, JsValue> {
    if settings.is_undefined() || settings.is_null() {
        return Ok(ThwaitesSettings::default());
    }
    from_value(settings)
        .map_err(|e| JsValue::from_str(&format!("Invalid Thwaites settings: {}", e)))
}

#[wasm_bindgen]
pub struct WasmBoundaryLayer {
    profile: BoundaryLayerProfile,
    solution: BoundaryLayerSolution,
}

impl WasmBoundaryLayer {
    pub(crate) fn solve(
        s: Vec<f64>,
        u_s: Vec<f64>,
        settings: ThwaitesSettings,
    ) -> Result<Self, String> {
        let profile = BoundaryLayerProfile::new(s, u_s).map_err(|e| e.to_string())?;
        let solution = solve_thwaites(&profile, settings).map_err(|e| e.to_string())?;
        Ok(Self { profile, solution })
    }
}

#[wasm_bindgen]
impl WasmBoundaryLayer {
    /// Solves one branch. `settings` may be `undefined` for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        s: Vec<f64>,
        u_s: Vec<f64>,
        settings: JsValue,
    ) -> Result<WasmBoundaryLayer, JsValue> {
        console_error_panic_hook::set_once();
        let settings = parse_settings(settings)?;
        Self::solve(s, u_s, settings)
            .map_err(|e| JsValue::from_str(&format!("Boundary-layer solve failed: {}", e)))
    }

    pub fn station_count(&self) -> usize {
        self.solution.len()
    }

    pub fn momentum_thickness(&self) -> Vec<f64> {
        self.solution.momentum_thickness()
    }

    pub fn shape_factor(&self) -> Vec<f64> {
        self.solution.shape_factor()
    }

    pub fn thwaites_parameter(&self) -> Vec<f64> {
        self.solution.thwaites_parameter()
    }

    pub fn displacement_thickness(&self) -> Vec<f64> {
        self.solution.displacement_thickness()
    }

    pub fn separation_index(&self) -> Option<f64> {
        self.solution.separation_index()
    }

    /// Arc length at separation, `undefined` if the flow stays attached.
    pub fn separation_location(&self) -> Result<Option<f64>, JsValue> {
        self.location().map_err(|e| JsValue::from_str(&e))
    }

    /// Value of a per-station sequence at the separation point.
    pub fn interpolate(&self, values: Vec<f64>) -> Result<Option<f64>, JsValue> {
        self.interpolate_values(&values).map_err(|e| JsValue::from_str(&e))
    }

    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        to_value(&self.solution)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

impl WasmBoundaryLayer {
    fn location(&self) -> Result<Option<f64>, String> {
        self.solution
            .separation_location(&self.profile)
            .map_err(|e| e.to_string())
    }

    fn interpolate_values(&self, values: &[f64]) -> Result<Option<f64>, String> {
        if values.len() != self.solution.len() {
            return Err(format!(
                "Expected {} values (one per station), got {}",
                self.solution.len(),
                values.len()
            ));
        }
        match self.solution.separation_index() {
            Some(index) => core_interpolate_at(values, index)
                .map(Some)
                .map_err(|e| e.to_string()),
            None => Ok(None),
        }
    }
}

/// Linear interpolation of `values` at a fractional station index.
#[wasm_bindgen]
pub fn interpolate_at(values: Vec<f64>, index: f64) -> Result<f64, JsValue> {
    core_interpolate_at(&values, index).map_err(|e| JsValue::from_str(&e.to_string()))
}
