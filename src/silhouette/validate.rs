//! Parameter correction shared by the silhouettes.
//!
//! Out-of-range parameters are never errors: each helper returns the value
//! the outline is computed with and logs when it differs from the input.

use crate::log::info;

/// Inner/outer radius pair used when the given pair is unusable.
pub const FALLBACK_INNER_RADIUS: f64 = 3.0;
pub const FALLBACK_OUTER_RADIUS: f64 = 8.0;

/// Clamp `value` into `[0, 1]`.
pub(crate) fn unit_interval(shape: &str, param: &str, value: f64) -> f64 {
    if value < 0.0 {
        info!(shape, param, value, "below 0, using 0");
        0.0
    } else if value > 1.0 {
        info!(shape, param, value, "above 1, using 1");
        1.0
    } else {
        value
    }
}

/// Replace `value` with `default` unless it lies in `[0, 1]`.
pub(crate) fn unit_or_default(shape: &str, param: &str, value: f64, default: f64) -> f64 {
    if (0.0..=1.0).contains(&value) {
        value
    } else {
        info!(shape, param, value, default, "outside [0, 1], using default");
        default
    }
}

/// Largest side or beam count; past it the integer angle step reaches zero.
pub const MAX_COUNT: i32 = 360;

/// Clamp a side or beam count into `[min, MAX_COUNT]`.
pub(crate) fn count_within(shape: &str, param: &str, value: i32, min: i32) -> i32 {
    if value < min {
        info!(shape, param, value, min, "too small, using minimum");
        min
    } else if value > MAX_COUNT {
        info!(shape, param, value, max = MAX_COUNT, "too large, using maximum");
        MAX_COUNT
    } else {
        value
    }
}

/// Cap a beam width at the diameter.
pub(crate) fn width_within(shape: &str, width: f64, radius: f64) -> f64 {
    let diameter = radius * 2.0;
    if width > diameter {
        info!(shape, width, diameter, "width exceeds diameter, capping");
        diameter
    } else {
        width
    }
}

/// Validate an `(outer, inner)` radius pair.
///
/// The inner radius must be smaller than the outer one and neither may be
/// negative; otherwise the fallback pair is used.
pub(crate) fn radii(shape: &str, outer: f64, inner: f64) -> (f64, f64) {
    if inner >= outer {
        info!(shape, outer, inner, "inner radius not below outer radius, using fallback");
        (FALLBACK_OUTER_RADIUS, FALLBACK_INNER_RADIUS)
    } else if inner < 0.0 || outer < 0.0 {
        info!(shape, outer, inner, "negative radius, using fallback");
        (FALLBACK_OUTER_RADIUS, FALLBACK_INNER_RADIUS)
    } else {
        (outer, inner)
    }
}
