//! Path builder for silhouette outlines.
//!
//! Shapes describe their outline as a sequence of move/line/arc/close
//! commands. The builder accumulates commands without validation and hands
//! out an immutable [`Path`] on [`PathBuilder::build`], after which it is
//! empty again and can be reused for the next outline.
//!
//! # Example
//!
//! ```
//! use rcore::geometry::PathBuilder;
//!
//! let path = PathBuilder::new()
//!     .move_to(0.0, 0.0)
//!     .line_to(10.0, 0.0)
//!     .line_to(10.0, 10.0)
//!     .build();
//!
//! assert_eq!(path.to_svg_data(), "M0,0 L10,0 L10,10 Z");
//! ```

use std::fmt::Write as _;

use glam::{DVec2, dvec2};

/// One drawing command of a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(DVec2),
    LineTo(DVec2),
    /// Elliptical arc to `to`, using SVG endpoint parameterization.
    ArcTo {
        to: DVec2,
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: bool,
        sweep: bool,
    },
    Close,
}

impl PathCommand {
    /// End point of the command, if it has one.
    pub fn end_point(&self) -> Option<DVec2> {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(p),
            PathCommand::ArcTo { to, .. } => Some(to),
            PathCommand::Close => None,
        }
    }

    /// Apply `f` to every coordinate the command carries.
    ///
    /// Arc radii are left alone; callers that rotate a path are expected to
    /// add the rotation to `x_axis_rotation` themselves.
    pub fn map_points(self, f: impl Fn(DVec2) -> DVec2) -> Self {
        match self {
            PathCommand::MoveTo(p) => PathCommand::MoveTo(f(p)),
            PathCommand::LineTo(p) => PathCommand::LineTo(f(p)),
            PathCommand::ArcTo {
                to,
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
            } => PathCommand::ArcTo {
                to: f(to),
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
            },
            PathCommand::Close => PathCommand::Close,
        }
    }
}

/// Accumulates path commands. Single-threaded use only.
#[derive(Debug, Default)]
pub struct PathBuilder {
    commands: Vec<PathCommand>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(dvec2(x, y)));
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.commands.push(PathCommand::LineTo(dvec2(x, y)));
        self
    }

    /// Arc with the default flags: sweep set, large-arc cleared.
    pub fn arc_to(&mut self, x: f64, y: f64, rx: f64, ry: f64) -> &mut Self {
        self.arc_to_with(x, y, rx, ry, true, false)
    }

    pub fn arc_to_with(
        &mut self,
        x: f64,
        y: f64,
        rx: f64,
        ry: f64,
        sweep: bool,
        large_arc: bool,
    ) -> &mut Self {
        self.commands.push(PathCommand::ArcTo {
            to: dvec2(x, y),
            rx,
            ry,
            x_axis_rotation: 0.0,
            large_arc,
            sweep,
        });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// Number of commands accumulated since the last build.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Finish the path: appends a final close, hands the commands over and
    /// leaves the builder empty.
    pub fn build(&mut self) -> Path {
        self.commands.push(PathCommand::Close);
        Path {
            commands: std::mem::take(&mut self.commands),
        }
    }
}

/// Immutable outline produced by [`PathBuilder::build`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    /// Build a path directly from commands (no trailing close is added).
    pub fn from_commands(commands: Vec<PathCommand>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// End points of every move, line and arc command, in order.
    pub fn vertices(&self) -> Vec<DVec2> {
        self.commands.iter().filter_map(PathCommand::end_point).collect()
    }

    /// Copy of the path with every coordinate passed through `f`.
    pub fn map_points(&self, f: impl Fn(DVec2) -> DVec2) -> Path {
        Path {
            commands: self.commands.iter().map(|c| c.map_points(&f)).collect(),
        }
    }

    /// SVG `d` attribute for this path.
    pub fn to_svg_data(&self) -> String {
        let mut out = String::new();
        for cmd in &self.commands {
            if !out.is_empty() {
                out.push(' ');
            }
            // Writing into a String cannot fail
            let _ = match *cmd {
                PathCommand::MoveTo(p) => write!(out, "M{},{}", fmt_num(p.x), fmt_num(p.y)),
                PathCommand::LineTo(p) => write!(out, "L{},{}", fmt_num(p.x), fmt_num(p.y)),
                PathCommand::ArcTo {
                    to,
                    rx,
                    ry,
                    x_axis_rotation,
                    large_arc,
                    sweep,
                } => write!(
                    out,
                    "A{},{} {} {} {} {},{}",
                    fmt_num(rx),
                    fmt_num(ry),
                    fmt_num(x_axis_rotation),
                    u8::from(large_arc),
                    u8::from(sweep),
                    fmt_num(to.x),
                    fmt_num(to.y)
                ),
                PathCommand::Close => write!(out, "Z"),
            };
        }
        out
    }

    /// Approximate the path with polygons, one per subpath.
    ///
    /// Arcs are subdivided so that no chord deviates from the true curve by
    /// more than `tolerance`.
    pub fn flatten(&self, tolerance: f64) -> Vec<Vec<DVec2>> {
        let mut rings = Vec::new();
        let mut current: Vec<DVec2> = Vec::new();
        let mut start = DVec2::ZERO;
        let mut pen = DVec2::ZERO;

        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) => {
                    if current.len() > 1 {
                        rings.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(p);
                    start = p;
                    pen = p;
                }
                PathCommand::LineTo(p) => {
                    if current.is_empty() {
                        current.push(pen);
                    }
                    current.push(p);
                    pen = p;
                }
                PathCommand::ArcTo {
                    to,
                    rx,
                    ry,
                    x_axis_rotation,
                    large_arc,
                    sweep,
                } => {
                    if current.is_empty() {
                        current.push(pen);
                    }
                    let arc = EndpointArc {
                        from: pen,
                        to,
                        rx,
                        ry,
                        x_axis_rotation,
                        large_arc,
                        sweep,
                    };
                    arc.flatten_into(tolerance, &mut current);
                    pen = to;
                }
                PathCommand::Close => {
                    if current.len() > 1 {
                        rings.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    // After a close the pen returns to the subpath start
                    pen = start;
                }
            }
        }
        if current.len() > 1 {
            rings.push(current);
        }
        rings
    }
}

/// Format a coordinate the way SVG consumers expect: integers without a
/// fraction, everything else rounded to 6 decimals with trailing zeros cut.
pub(crate) fn fmt_num(v: f64) -> String {
    let rounded = (v * 1e6).round() / 1e6;
    // Avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{}", rounded)
}

// ============================================================================
// Arc flattening
// ============================================================================

/// An SVG endpoint-parameterized arc, convertible to center form.
#[derive(Debug, Clone, Copy)]
struct EndpointArc {
    from: DVec2,
    to: DVec2,
    rx: f64,
    ry: f64,
    x_axis_rotation: f64,
    large_arc: bool,
    sweep: bool,
}

/// Center parameterization of an elliptical arc.
#[derive(Debug, Clone, Copy)]
struct CenterArc {
    center: DVec2,
    rx: f64,
    ry: f64,
    phi: f64,
    start_angle: f64,
    sweep_angle: f64,
}

impl CenterArc {
    fn point_at(&self, angle: f64) -> DVec2 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_a, cos_a) = angle.sin_cos();
        let x = self.rx * cos_a;
        let y = self.ry * sin_a;
        self.center + dvec2(cos_phi * x - sin_phi * y, sin_phi * x + cos_phi * y)
    }
}

impl EndpointArc {
    /// Conversion from endpoint to center parameterization (SVG 1.1 F.6.5),
    /// including the out-of-range radius correction of F.6.6.
    ///
    /// Returns `None` when the arc degenerates into a straight line.
    fn to_center(self) -> Option<CenterArc> {
        if self.from == self.to {
            return None;
        }
        let mut rx = self.rx.abs();
        let mut ry = self.ry.abs();
        if rx == 0.0 || ry == 0.0 {
            return None;
        }

        let phi = self.x_axis_rotation.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let half = (self.from - self.to) / 2.0;
        let x1p = cos_phi * half.x + sin_phi * half.y;
        let y1p = -sin_phi * half.x + cos_phi * half.y;

        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            let scale = lambda.sqrt();
            rx *= scale;
            ry *= scale;
        }

        let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
        let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
        let mut coef = (num / den).max(0.0).sqrt();
        if self.large_arc == self.sweep {
            coef = -coef;
        }
        let cxp = coef * rx * y1p / ry;
        let cyp = -coef * ry * x1p / rx;

        let mid = (self.from + self.to) / 2.0;
        let center = dvec2(
            cos_phi * cxp - sin_phi * cyp + mid.x,
            sin_phi * cxp + cos_phi * cyp + mid.y,
        );

        let u = dvec2((x1p - cxp) / rx, (y1p - cyp) / ry);
        let v = dvec2((-x1p - cxp) / rx, (-y1p - cyp) / ry);
        let start_angle = u.y.atan2(u.x);
        let mut sweep_angle = (u.x * v.y - u.y * v.x).atan2(u.dot(v));
        if !self.sweep && sweep_angle > 0.0 {
            sweep_angle -= std::f64::consts::TAU;
        } else if self.sweep && sweep_angle < 0.0 {
            sweep_angle += std::f64::consts::TAU;
        }

        Some(CenterArc {
            center,
            rx,
            ry,
            phi,
            start_angle,
            sweep_angle,
        })
    }

    /// Append the flattened arc (excluding its start point) to `out`.
    fn flatten_into(self, tolerance: f64, out: &mut Vec<DVec2>) {
        let Some(arc) = self.to_center() else {
            out.push(self.to);
            return;
        };
        let radius = arc.rx.max(arc.ry);
        let tolerance = tolerance.max(1e-6);
        let step = if tolerance >= radius {
            std::f64::consts::FRAC_PI_2
        } else {
            2.0 * (1.0 - tolerance / radius).acos()
        };
        let segments = ((arc.sweep_angle.abs() / step).ceil() as usize).clamp(1, 1024);
        for i in 1..segments {
            let t = i as f64 / segments as f64;
            out.push(arc.point_at(arc.start_angle + arc.sweep_angle * t));
        }
        // Land exactly on the requested end point
        out.push(self.to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> DVec2 {
        dvec2(x, y)
    }

    fn assert_point_eq(actual: DVec2, expected: DVec2) {
        const EPSILON: f64 = 1e-9;
        assert!(
            (actual - expected).length() < EPSILON,
            "point mismatch: {} != {}",
            actual,
            expected
        );
    }

    #[test]
    fn build_appends_close_and_resets() {
        let mut builder = PathBuilder::new();
        builder.move_to(1.0, 2.0).line_to(3.0, 4.0);
        assert_eq!(builder.len(), 2);

        let path = builder.build();
        assert_eq!(
            path.commands(),
            &[
                PathCommand::MoveTo(pt(1.0, 2.0)),
                PathCommand::LineTo(pt(3.0, 4.0)),
                PathCommand::Close,
            ]
        );
        assert!(builder.is_empty());

        // Reuse starts from scratch
        let second = builder.move_to(5.0, 5.0).build();
        assert_eq!(second.commands().len(), 2);
    }

    #[test]
    fn explicit_close_keeps_both_closes() {
        let path = PathBuilder::new()
            .move_to(0.0, 0.0)
            .line_to(1.0, 0.0)
            .close()
            .build();
        let closes = path
            .commands()
            .iter()
            .filter(|c| matches!(c, PathCommand::Close))
            .count();
        assert_eq!(closes, 2);
    }

    #[test]
    fn arc_defaults_to_sweep_small() {
        let path = PathBuilder::new()
            .move_to(0.0, 0.0)
            .arc_to(10.0, 0.0, 5.0, 5.0)
            .build();
        assert_eq!(
            path.commands()[1],
            PathCommand::ArcTo {
                to: pt(10.0, 0.0),
                rx: 5.0,
                ry: 5.0,
                x_axis_rotation: 0.0,
                large_arc: false,
                sweep: true,
            }
        );
        assert_eq!(path.to_svg_data(), "M0,0 A5,5 0 0 1 10,0 Z");
    }

    #[test]
    fn svg_data_trims_float_noise() {
        let path = PathBuilder::new()
            .move_to(6.123233995736766e-16, -10.0)
            .line_to(0.5, 1.0 / 3.0)
            .build();
        assert_eq!(path.to_svg_data(), "M0,-10 L0.5,0.333333 Z");
    }

    #[test]
    fn vertices_skip_close() {
        let path = PathBuilder::new()
            .move_to(0.0, 0.0)
            .line_to(1.0, 0.0)
            .arc_to(2.0, 1.0, 1.0, 1.0)
            .build();
        assert_eq!(path.vertices(), vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(2.0, 1.0)]);
    }

    #[test]
    fn half_circle_flattens_onto_circle() {
        // Upper half of a unit circle around (1, 0), drawn clockwise on screen
        let path = PathBuilder::new()
            .move_to(0.0, 0.0)
            .arc_to(2.0, 0.0, 1.0, 1.0)
            .build();
        let rings = path.flatten(0.01);
        assert_eq!(rings.len(), 1);
        let ring = &rings[0];
        assert!(ring.len() > 4);
        for p in ring {
            assert!(((*p - pt(1.0, 0.0)).length() - 1.0).abs() < 1e-9);
            // sweep=true goes through negative y (upwards on screen)
            assert!(p.y <= 1e-9);
        }
        assert_point_eq(*ring.last().unwrap(), pt(2.0, 0.0));
    }

    #[test]
    fn undersized_radius_is_scaled_up() {
        // Radius 1 cannot span a chord of 4, so it becomes a half circle of radius 2
        let path = PathBuilder::new()
            .move_to(0.0, 0.0)
            .arc_to(4.0, 0.0, 1.0, 1.0)
            .build();
        let ring = &path.flatten(0.01)[0];
        let mid = ring[ring.len() / 2];
        assert!(((mid - pt(2.0, 0.0)).length() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn zero_radius_arc_is_a_line() {
        let path = PathBuilder::new()
            .move_to(0.0, 0.0)
            .arc_to(3.0, 4.0, 0.0, 0.0)
            .build();
        assert_eq!(path.flatten(0.1), vec![vec![pt(0.0, 0.0), pt(3.0, 4.0)]]);
    }

    #[test]
    fn close_returns_pen_to_subpath_start() {
        let path = PathBuilder::new()
            .move_to(5.0, 5.0)
            .line_to(6.0, 5.0)
            .close()
            .line_to(5.0, 6.0)
            .build();
        let rings = path.flatten(0.1);
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[1], vec![pt(5.0, 5.0), pt(5.0, 6.0)]);
    }
}
