//! Polar point math shared by the radial silhouettes.
//!
//! Angles are in degrees, measured counter-clockwise from the positive x
//! axis as seen on screen (y grows downwards, so "up" means `cy - y`).

use glam::{DVec2, dvec2};

/// Point at `angle` degrees on a circle of `radius` around `center`.
///
/// The offsets are computed as absolute values of `r·cos` and `r·sin` and
/// re-signed by quadrant, with the quadrant boundaries inclusive at 90, 180,
/// 270 and 360. Angles above 360 (and below 0) land in the first quadrant.
pub fn quadrant_point(center: DVec2, radius: f64, angle: f64) -> DVec2 {
    let rad = angle.to_radians();
    let x = (radius * rad.cos()).abs();
    let y = (radius * rad.sin()).abs();
    if angle <= 90.0 || angle > 360.0 {
        dvec2(center.x + x, center.y - y)
    } else if angle <= 180.0 {
        dvec2(center.x - x, center.y - y)
    } else if angle <= 270.0 {
        dvec2(center.x - x, center.y + y)
    } else {
        dvec2(center.x + x, center.y + y)
    }
}

/// Advance `angle` by `step`, wrapping once when passing 360.
pub fn advance(angle: f64, step: f64) -> f64 {
    let next = angle + step;
    if next > 360.0 { next - 360.0 } else { next }
}

/// Fold an angle into `[0, 360)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle % 360.0;
    if a < 0.0 { a + 360.0 } else { a }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: DVec2, expected: DVec2) {
        assert!(
            (actual - expected).length() < 1e-9,
            "{} != {}",
            actual,
            expected
        );
    }

    #[test]
    fn cardinal_points() {
        let c = dvec2(50.0, 50.0);
        assert_close(quadrant_point(c, 10.0, 0.0), dvec2(60.0, 50.0));
        assert_close(quadrant_point(c, 10.0, 90.0), dvec2(50.0, 40.0));
        assert_close(quadrant_point(c, 10.0, 180.0), dvec2(40.0, 50.0));
        assert_close(quadrant_point(c, 10.0, 270.0), dvec2(50.0, 60.0));
        assert_close(quadrant_point(c, 10.0, 360.0), dvec2(60.0, 50.0));
    }

    #[test]
    fn diagonal_quadrants() {
        let c = DVec2::ZERO;
        let d = 10.0 * std::f64::consts::FRAC_1_SQRT_2;
        assert_close(quadrant_point(c, 10.0, 45.0), dvec2(d, -d));
        assert_close(quadrant_point(c, 10.0, 135.0), dvec2(-d, -d));
        assert_close(quadrant_point(c, 10.0, 225.0), dvec2(-d, d));
        assert_close(quadrant_point(c, 10.0, 315.0), dvec2(d, d));
    }

    #[test]
    fn out_of_range_angles_use_first_quadrant() {
        let d = 10.0 * std::f64::consts::FRAC_1_SQRT_2;
        assert_close(quadrant_point(DVec2::ZERO, 10.0, 405.0), dvec2(d, -d));
        assert_close(quadrant_point(DVec2::ZERO, 10.0, -45.0), dvec2(d, -d));
    }

    #[test]
    fn advance_wraps_once() {
        assert_eq!(advance(300.0, 90.0), 30.0);
        assert_eq!(advance(270.0, 90.0), 360.0);
        assert_eq!(advance(0.0, 45.0), 45.0);
    }

    #[test]
    fn normalize_folds_negative() {
        assert_eq!(normalize_angle(-90.0), 270.0);
        assert_eq!(normalize_angle(720.0), 0.0);
        assert_eq!(normalize_angle(45.0), 45.0);
    }
}
