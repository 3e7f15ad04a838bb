use crate::error::{BoundaryLayerError, BoundaryLayerResult};
use crate::traits::Scalar;

/// Linearly interpolates a per-station sequence at a fractional station index.
///
/// Integer indices return the stored sample unchanged. Indices outside
/// `[0, len - 1]` are rejected as `OutOfRange`, never clamped. An empty
/// sequence is `InvalidInput`.
pub fn interpolate_at<T: Scalar>(values: &[T], index: f64) -> BoundaryLayerResult<T> {
    if values.is_empty() {
        return Err(BoundaryLayerError::InvalidInput(
            "cannot interpolate an empty sequence".to_string(),
        ));
    }

    let max = (values.len() - 1) as f64;
    if !index.is_finite() || index < 0.0 || index > max {
        return Err(BoundaryLayerError::OutOfRange { index, max });
    }

    let lower = index.floor();
    let i = lower as usize;
    let fraction = index - lower;
    if fraction == 0.0 {
        return Ok(values[i]);
    }

    let weight = T::from_f64(fraction).ok_or(BoundaryLayerError::OutOfRange { index, max })?;
    Ok(values[i] + weight * (values[i + 1] - values[i]))
}
