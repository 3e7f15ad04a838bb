//! WASM bindings for the boundary-layer engine.
//!
//! `branch` wraps a single boundary-layer solve; `surface` splits a solved
//! panel surface and returns both branches as serialized payloads.

mod branch;
mod surface;

pub use branch::{interpolate_at, WasmBoundaryLayer};
pub use surface::solve_surface;
