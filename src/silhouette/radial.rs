//! Silhouettes built from points on circles around a center.
//!
//! Regular polygons and stars step around the circle in whole degrees
//! (`360 / sides` in integer arithmetic), so sides that do not divide 360
//! leave a small gap that the closing segment absorbs. Rays step in
//! fractional degrees.

use glam::{DVec2, dvec2};

use super::validate::{count_within, radii, unit_interval};
use super::{ShapeState, Silhouette, shape_params};
use crate::geometry::{Outline, Path, PathBuilder, advance, quadrant_point};

/// Sector step in whole degrees.
fn integer_step(sides: i32) -> f64 {
    f64::from(360 / sides)
}

/// Closed polygon through `sides` points, starting at angle 0.
///
/// `sides` must already be validated.
pub(crate) fn polygon_path(center: DVec2, radius: f64, sides: i32) -> Path {
    let step = integer_step(sides);
    let mut angle = 0.0;
    let mut builder = PathBuilder::new();
    for i in 0..sides {
        let p = quadrant_point(center, radius, angle);
        if i == 0 {
            builder.move_to(p.x, p.y);
        } else {
            builder.line_to(p.x, p.y);
        }
        angle = advance(angle, step);
    }
    builder.build()
}

// ============================================================================
// Regular polygon
// ============================================================================

/// Polygon with `sides` vertices on a circle, first vertex at angle 0.
#[derive(Debug)]
pub struct RegularPolygon {
    cx: f64,
    cy: f64,
    radius: f64,
    sides: i32,
    state: ShapeState,
}

impl Default for RegularPolygon {
    fn default() -> Self {
        Self {
            cx: 0.0,
            cy: 0.0,
            radius: 0.0,
            sides: 3,
            state: ShapeState::default(),
        }
    }
}

impl RegularPolygon {
    pub fn new(cx: f64, cy: f64, radius: f64, sides: i32) -> Self {
        let mut polygon = Self {
            cx,
            cy,
            radius,
            sides,
            state: ShapeState::default(),
        };
        polygon.recompute();
        polygon
    }
}

shape_params!(RegularPolygon {
    cx: f64 => set_cx,
    cy: f64 => set_cy,
    radius: f64 => set_radius,
    sides: i32 => set_sides,
});

impl Silhouette for RegularPolygon {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn compute(&self) -> Outline {
        let sides = count_within("RegularPolygon", "sides", self.sides, 3);
        polygon_path(dvec2(self.cx, self.cy), self.radius, sides).into()
    }

    fn style_class(&self) -> &'static str {
        "regular-polygon"
    }
}

// ============================================================================
// Star
// ============================================================================

/// Star with `sides` outer points, the first pointing straight up.
#[derive(Debug)]
pub struct Star {
    cx: f64,
    cy: f64,
    outer_radius: f64,
    inner_radius: f64,
    sides: i32,
    state: ShapeState,
}

impl Default for Star {
    fn default() -> Self {
        Self {
            cx: 0.0,
            cy: 0.0,
            outer_radius: 0.0,
            inner_radius: 0.0,
            sides: 3,
            state: ShapeState::default(),
        }
    }
}

impl Star {
    pub fn new(cx: f64, cy: f64, outer_radius: f64, inner_radius: f64, sides: i32) -> Self {
        let mut star = Self {
            cx,
            cy,
            outer_radius,
            inner_radius,
            sides,
            state: ShapeState::default(),
        };
        star.recompute();
        star
    }

    /// Star without an explicit point count; the minimum of two applies.
    pub fn with_radii(cx: f64, cy: f64, outer_radius: f64, inner_radius: f64) -> Self {
        Self::new(cx, cy, outer_radius, inner_radius, 0)
    }
}

shape_params!(Star {
    cx: f64 => set_cx,
    cy: f64 => set_cy,
    outer_radius: f64 => set_outer_radius,
    inner_radius: f64 => set_inner_radius,
    sides: i32 => set_sides,
});

impl Silhouette for Star {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn compute(&self) -> Outline {
        let sides = count_within("Star", "sides", self.sides, 2);
        let (outer, inner) = radii("Star", self.outer_radius, self.inner_radius);
        let center = dvec2(self.cx, self.cy);

        let step = integer_step(sides);
        let mut a = 90.0;
        let mut b = advance(90.0, step / 2.0);
        let mut builder = PathBuilder::new();
        for i in 0..sides {
            let tip = quadrant_point(center, outer, a);
            let notch = quadrant_point(center, inner, b);
            if i == 0 {
                builder.move_to(tip.x, tip.y);
            } else {
                builder.line_to(tip.x, tip.y);
            }
            builder.line_to(notch.x, notch.y);
            a = advance(a, step);
            b = advance(b, step);
        }
        builder.build().into()
    }

    fn style_class(&self) -> &'static str {
        "star"
    }
}

// ============================================================================
// Rays
// ============================================================================

/// Wedge-shaped beams radiating from the center.
///
/// `extent` is the share of each beam's sector that the beam covers: 0 gives
/// hairlines, 0.5 gives beams as wide as the gaps, 1 closes the gaps.
#[derive(Debug)]
pub struct Rays {
    cx: f64,
    cy: f64,
    radius: f64,
    beam_count: i32,
    extent: f64,
    rounded: bool,
    state: ShapeState,
}

impl Default for Rays {
    fn default() -> Self {
        Self {
            cx: 0.0,
            cy: 0.0,
            radius: 0.0,
            beam_count: 3,
            extent: 0.0,
            rounded: true,
            state: ShapeState::default(),
        }
    }
}

impl Rays {
    /// Beams covering half their sector, with straight ends.
    pub fn new(cx: f64, cy: f64, radius: f64, beam_count: i32) -> Self {
        Self::with_extent(cx, cy, radius, beam_count, 0.5, false)
    }

    pub fn with_extent(
        cx: f64,
        cy: f64,
        radius: f64,
        beam_count: i32,
        extent: f64,
        rounded: bool,
    ) -> Self {
        let mut rays = Self {
            cx,
            cy,
            radius,
            beam_count,
            extent,
            rounded,
            state: ShapeState::default(),
        };
        rays.recompute();
        rays
    }
}

shape_params!(Rays {
    cx: f64 => set_cx,
    cy: f64 => set_cy,
    radius: f64 => set_radius,
    beam_count: i32 => set_beam_count,
    extent: f64 => set_extent,
    rounded: bool => set_rounded,
});

impl Silhouette for Rays {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn compute(&self) -> Outline {
        let beams = count_within("Rays", "beam_count", self.beam_count, 2);
        let extent = unit_interval("Rays", "extent", self.extent);
        let center = dvec2(self.cx, self.cy);

        let edges = i64::from(beams) * 2;
        let step = 360.0 / edges as f64;
        let spread = extent * step * 2.0 - step;
        let mut a = 0.0;
        let points: Vec<DVec2> = (0..edges)
            .map(|i| {
                let mut r = if i % 2 == 0 { a } else { a + spread };
                if r < 0.0 {
                    r += 360.0;
                }
                a = advance(a, step);
                quadrant_point(center, self.radius, r)
            })
            .collect();

        let mut builder = PathBuilder::new();
        builder.move_to(center.x, center.y);
        for beam in points.chunks_exact(2) {
            let (start, end) = (beam[0], beam[1]);
            builder.line_to(start.x, start.y);
            if self.rounded {
                builder.arc_to_with(end.x, end.y, self.radius, self.radius, false, false);
            } else {
                builder.line_to(end.x, end.y);
            }
            builder.close();
        }
        builder.build().into()
    }

    fn style_class(&self) -> &'static str {
        "rays"
    }
}

// ============================================================================
// Donut
// ============================================================================

/// Ring between two concentric circles, or two concentric polygons when
/// `sides` is greater than 2.
#[derive(Debug)]
pub struct Donut {
    cx: f64,
    cy: f64,
    outer_radius: f64,
    inner_radius: f64,
    sides: i32,
    state: ShapeState,
}

impl Default for Donut {
    fn default() -> Self {
        Self {
            cx: 0.0,
            cy: 0.0,
            outer_radius: 0.0,
            inner_radius: 0.0,
            sides: 3,
            state: ShapeState::default(),
        }
    }
}

impl Donut {
    pub fn new(cx: f64, cy: f64, outer_radius: f64, inner_radius: f64, sides: i32) -> Self {
        let mut donut = Self {
            cx,
            cy,
            outer_radius,
            inner_radius,
            sides,
            state: ShapeState::default(),
        };
        donut.recompute();
        donut
    }

    /// Circular ring.
    pub fn circular(cx: f64, cy: f64, outer_radius: f64, inner_radius: f64) -> Self {
        Self::new(cx, cy, outer_radius, inner_radius, 0)
    }
}

shape_params!(Donut {
    cx: f64 => set_cx,
    cy: f64 => set_cy,
    outer_radius: f64 => set_outer_radius,
    inner_radius: f64 => set_inner_radius,
    sides: i32 => set_sides,
});

impl Silhouette for Donut {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn compute(&self) -> Outline {
        let (outer, inner) = radii("Donut", self.outer_radius, self.inner_radius);
        let center = dvec2(self.cx, self.cy);
        if self.sides > 2 {
            let sides = count_within("Donut", "sides", self.sides, 3);
            Outline::subtract(
                polygon_path(center, outer, sides),
                polygon_path(center, inner, sides),
            )
        } else {
            Outline::subtract(Outline::circle(center, outer), Outline::circle(center, inner))
        }
    }

    fn style_class(&self) -> &'static str {
        "donut"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PathCommand;
    use crate::silhouette::validate::MAX_COUNT;

    fn vertices(outline: &Outline) -> Vec<DVec2> {
        match outline {
            Outline::Path(path) => path.vertices(),
            other => panic!("expected a path, got {:?}", other),
        }
    }

    fn assert_points(actual: &[DVec2], expected: &[(f64, f64)]) {
        assert_eq!(actual.len(), expected.len(), "{:?}", actual);
        for (a, &(x, y)) in actual.iter().zip(expected) {
            assert!((*a - dvec2(x, y)).length() < 1e-9, "{} != ({}, {})", a, x, y);
        }
    }

    #[test]
    fn square_polygon_vertices() {
        let square = RegularPolygon::new(0.0, 0.0, 10.0, 4);
        let outline = square.shape().unwrap();
        assert_points(
            &vertices(outline),
            &[(10.0, 0.0), (0.0, -10.0), (-10.0, 0.0), (0.0, 10.0)],
        );
        let Outline::Path(path) = outline else {
            unreachable!()
        };
        assert_eq!(path.commands().last(), Some(&PathCommand::Close));
    }

    #[test]
    fn polygon_sides_below_three_become_triangle() {
        let degenerate = RegularPolygon::new(0.0, 0.0, 10.0, 1);
        let triangle = RegularPolygon::new(0.0, 0.0, 10.0, 3);
        assert_eq!(degenerate.shape(), triangle.shape());
        // The stored value is untouched
        assert_eq!(degenerate.sides(), 1);
    }

    #[test]
    fn heptagon_uses_whole_degree_steps() {
        // 360 / 7 = 51 in integer arithmetic
        let heptagon = RegularPolygon::new(0.0, 0.0, 1.0, 7);
        let points = vertices(heptagon.shape().unwrap());
        assert_eq!(points.len(), 7);
        let expected = quadrant_point(DVec2::ZERO, 1.0, 51.0);
        assert!((points[1] - expected).length() < 1e-12);
    }

    #[test]
    fn star_alternates_tips_and_notches() {
        let star = Star::new(0.0, 0.0, 10.0, 4.0, 4);
        let points = vertices(star.shape().unwrap());
        assert_eq!(points.len(), 8);
        // first tip straight up, first notch at 135 degrees
        assert!((points[0] - dvec2(0.0, -10.0)).length() < 1e-9);
        assert!((points[1] - quadrant_point(DVec2::ZERO, 4.0, 135.0)).length() < 1e-9);
        for (i, p) in points.iter().enumerate() {
            let expected = if i % 2 == 0 { 10.0 } else { 4.0 };
            assert!((p.length() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn star_with_inverted_radii_uses_fallback() {
        let bad = Star::new(0.0, 0.0, 2.0, 5.0, 5);
        let fallback = Star::new(0.0, 0.0, 8.0, 3.0, 5);
        assert_eq!(bad.shape(), fallback.shape());
    }

    #[test]
    fn star_without_sides_has_two_points() {
        let star = Star::with_radii(0.0, 0.0, 10.0, 4.0);
        assert_eq!(vertices(star.shape().unwrap()).len(), 4);
    }

    #[test]
    fn rays_have_one_closed_wedge_per_beam() {
        let rays = Rays::with_extent(0.0, 0.0, 10.0, 4, 0.5, false);
        let Outline::Path(path) = rays.shape().unwrap() else {
            panic!("rays are a single path");
        };
        let closes = path
            .commands()
            .iter()
            .filter(|c| matches!(c, PathCommand::Close))
            .count();
        // one close per beam plus the builder's final close
        assert_eq!(closes, 5);
        assert!(
            !path
                .commands()
                .iter()
                .any(|c| matches!(c, PathCommand::ArcTo { .. }))
        );
    }

    #[test]
    fn rounded_rays_use_counter_sweep_arcs() {
        let rays = Rays::with_extent(0.0, 0.0, 10.0, 3, 0.5, true);
        let Outline::Path(path) = rays.shape().unwrap() else {
            panic!("rays are a single path");
        };
        let arcs: Vec<_> = path
            .commands()
            .iter()
            .filter_map(|c| match c {
                PathCommand::ArcTo {
                    rx, sweep, large_arc, ..
                } => Some((*rx, *sweep, *large_arc)),
                _ => None,
            })
            .collect();
        assert_eq!(arcs, vec![(10.0, false, false); 3]);
    }

    #[test]
    fn rays_extent_is_clamped() {
        let wide = Rays::with_extent(0.0, 0.0, 10.0, 3, 7.0, false);
        let full = Rays::with_extent(0.0, 0.0, 10.0, 3, 1.0, false);
        assert_eq!(wide.shape(), full.shape());
        assert_eq!(wide.extent(), 7.0);
    }

    #[test]
    fn huge_beam_counts_are_capped() {
        let mut rays = Rays::new(0.0, 0.0, 10.0, 3);
        rays.set_beam_count(i32::MAX);
        assert_eq!(rays.beam_count(), i32::MAX);
        assert_eq!(rays.shape(), Some(&Rays::new(0.0, 0.0, 10.0, MAX_COUNT).compute()));

        let polygon = RegularPolygon::new(0.0, 0.0, 10.0, i32::MAX);
        assert_eq!(polygon.shape(), RegularPolygon::new(0.0, 0.0, 10.0, MAX_COUNT).shape());

        let donut = Donut::new(0.0, 0.0, 10.0, 4.0, i32::MAX);
        assert_eq!(donut.shape(), Donut::new(0.0, 0.0, 10.0, 4.0, MAX_COUNT).shape());
    }

    #[test]
    fn rays_half_extent_splits_circle_evenly() {
        // With extent 0.5 every beam edge sits on a multiple of 360 / (2 * beams)
        let rays = Rays::with_extent(0.0, 0.0, 10.0, 2, 0.5, false);
        let Outline::Path(path) = rays.shape().unwrap() else {
            unreachable!()
        };
        let edges: Vec<DVec2> = path
            .commands()
            .iter()
            .filter_map(|c| match c {
                PathCommand::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_points(
            &edges,
            &[(10.0, 0.0), (0.0, -10.0), (-10.0, 0.0), (0.0, 10.0)],
        );
    }

    #[test]
    fn donut_switches_between_circles_and_polygons() {
        let round = Donut::circular(50.0, 50.0, 50.0, 20.0);
        assert!(matches!(
            round.shape(),
            Some(Outline::Difference(a, b))
                if matches!(**a, Outline::Circle { .. }) && matches!(**b, Outline::Circle { .. })
        ));
        let ring = round.shape().unwrap();
        assert!(ring.contains(dvec2(85.0, 50.0)));
        assert!(!ring.contains(dvec2(50.0, 50.0)));

        let hex = Donut::new(50.0, 50.0, 50.0, 20.0, 6);
        assert!(matches!(
            hex.shape(),
            Some(Outline::Difference(a, _)) if matches!(**a, Outline::Path(_))
        ));
    }

    #[test]
    fn donut_setter_recomputes() {
        let mut donut = Donut::circular(0.0, 0.0, 10.0, 5.0);
        donut.set_inner_radius(2.0);
        assert!(donut.shape().unwrap().contains(dvec2(3.0, 0.0)));
        assert_eq!(donut.revision(), 2);
    }
}
