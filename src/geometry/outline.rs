//! Outlines: the boundary values silhouettes publish.
//!
//! An outline is either a primitive (free-form path, circle, rounded
//! rectangle) or a boolean composition of two outlines. Compositions are
//! kept symbolic; surfaces decide how to render them, and the geometric
//! queries here evaluate them pointwise.

use glam::{DVec2, dvec2};

use super::path_builder::{Path, PathBuilder, PathCommand};

/// Flattening tolerance used by the geometric queries.
const QUERY_TOLERANCE: f64 = 0.01;

/// Axis-aligned rectangle with elliptical corners, optionally rotated about
/// its center.
///
/// `arc_width` and `arc_height` are corner diameters, as in most retained
/// mode toolkits; they are clamped to the rectangle's size when drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoundRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub arc_width: f64,
    pub arc_height: f64,
    /// Clockwise rotation in degrees (screen coordinates).
    pub rotate: f64,
}

impl RoundRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_arc(mut self, arc_width: f64, arc_height: f64) -> Self {
        self.arc_width = arc_width;
        self.arc_height = arc_height;
        self
    }

    pub fn with_rotate(mut self, degrees: f64) -> Self {
        self.rotate = degrees;
        self
    }

    pub fn center(&self) -> DVec2 {
        dvec2(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Clockwise path of the rectangle, rotation applied.
    pub fn to_path(&self) -> Path {
        let (x, y, w, h) = (self.x, self.y, self.width, self.height);
        let a = (self.arc_width / 2.0).min(w / 2.0).max(0.0);
        let b = (self.arc_height / 2.0).min(h / 2.0).max(0.0);

        let mut builder = PathBuilder::new();
        if a > 0.0 && b > 0.0 {
            builder
                .move_to(x + a, y)
                .line_to(x + w - a, y)
                .arc_to(x + w, y + b, a, b)
                .line_to(x + w, y + h - b)
                .arc_to(x + w - a, y + h, a, b)
                .line_to(x + a, y + h)
                .arc_to(x, y + h - b, a, b)
                .line_to(x, y + b)
                .arc_to(x + a, y, a, b);
        } else {
            builder
                .move_to(x, y)
                .line_to(x + w, y)
                .line_to(x + w, y + h)
                .line_to(x, y + h);
        }
        let path = builder.build();

        if self.rotate == 0.0 {
            path
        } else {
            rotate_path(&path, self.center(), self.rotate)
        }
    }
}

/// Rotate every point of `path` clockwise by `degrees` around `pivot`.
pub fn rotate_path(path: &Path, pivot: DVec2, degrees: f64) -> Path {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let rotate = |p: DVec2| {
        let d = p - pivot;
        pivot + dvec2(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
    };
    let commands = path
        .commands()
        .iter()
        .map(|cmd| match cmd.map_points(rotate) {
            PathCommand::ArcTo {
                to,
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
            } => PathCommand::ArcTo {
                to,
                rx,
                ry,
                x_axis_rotation: x_axis_rotation + degrees,
                large_arc,
                sweep,
            },
            other => other,
        })
        .collect();
    Path::from_commands(commands)
}

/// Boundary geometry of a silhouette.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Path(Path),
    Circle { center: DVec2, radius: f64 },
    Rect(RoundRect),
    Union(Box<Outline>, Box<Outline>),
    Intersection(Box<Outline>, Box<Outline>),
    /// First operand minus the second.
    Difference(Box<Outline>, Box<Outline>),
}

impl From<Path> for Outline {
    fn from(path: Path) -> Self {
        Outline::Path(path)
    }
}

impl From<RoundRect> for Outline {
    fn from(rect: RoundRect) -> Self {
        Outline::Rect(rect)
    }
}

impl Outline {
    pub fn circle(center: DVec2, radius: f64) -> Self {
        Outline::Circle { center, radius }
    }

    pub fn union(a: impl Into<Outline>, b: impl Into<Outline>) -> Self {
        Outline::Union(Box::new(a.into()), Box::new(b.into()))
    }

    pub fn intersect(a: impl Into<Outline>, b: impl Into<Outline>) -> Self {
        Outline::Intersection(Box::new(a.into()), Box::new(b.into()))
    }

    pub fn subtract(a: impl Into<Outline>, b: impl Into<Outline>) -> Self {
        Outline::Difference(Box::new(a.into()), Box::new(b.into()))
    }

    /// Path for primitive outlines; `None` for compositions.
    pub fn to_path(&self) -> Option<Path> {
        match self {
            Outline::Path(path) => Some(path.clone()),
            Outline::Circle { center, radius } => Some(circle_path(*center, *radius)),
            Outline::Rect(rect) => Some(rect.to_path()),
            Outline::Union(..) | Outline::Intersection(..) | Outline::Difference(..) => None,
        }
    }

    /// Number of primitive outlines in this tree.
    pub fn primitive_count(&self) -> usize {
        match self {
            Outline::Path(_) | Outline::Circle { .. } | Outline::Rect(_) => 1,
            Outline::Union(a, b) | Outline::Intersection(a, b) | Outline::Difference(a, b) => {
                a.primitive_count() + b.primitive_count()
            }
        }
    }

    /// Whether `point` lies inside the filled outline (nonzero rule for
    /// primitives).
    pub fn contains(&self, point: DVec2) -> bool {
        match self {
            Outline::Circle { center, radius } => point.distance(*center) <= *radius,
            Outline::Union(a, b) => a.contains(point) || b.contains(point),
            Outline::Intersection(a, b) => a.contains(point) && b.contains(point),
            Outline::Difference(a, b) => a.contains(point) && !b.contains(point),
            primitive => primitive
                .to_path()
                .map(|path| winding_number(&path.flatten(QUERY_TOLERANCE), point) != 0)
                .unwrap_or(false),
        }
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty outline.
    ///
    /// Bounds of an intersection are the overlap of both operands' bounds;
    /// bounds of a difference are those of the first operand.
    pub fn bounds(&self) -> Option<(DVec2, DVec2)> {
        match self {
            Outline::Circle { center, radius } => {
                let r = DVec2::splat(radius.abs());
                Some((*center - r, *center + r))
            }
            Outline::Union(a, b) => match (a.bounds(), b.bounds()) {
                (Some((amin, amax)), Some((bmin, bmax))) => Some((amin.min(bmin), amax.max(bmax))),
                (one, None) | (None, one) => one,
            },
            Outline::Intersection(a, b) => {
                let (amin, amax) = a.bounds()?;
                let (bmin, bmax) = b.bounds()?;
                let (min, max) = (amin.max(bmin), amax.min(bmax));
                (min.x <= max.x && min.y <= max.y).then_some((min, max))
            }
            Outline::Difference(a, _) => a.bounds(),
            primitive => {
                let path = primitive.to_path()?;
                let mut points = path.flatten(QUERY_TOLERANCE).into_iter().flatten();
                let first = points.next()?;
                Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
            }
        }
    }
}

/// Full circle as two half arcs, clockwise from the leftmost point.
fn circle_path(center: DVec2, radius: f64) -> Path {
    PathBuilder::new()
        .move_to(center.x - radius, center.y)
        .arc_to(center.x + radius, center.y, radius, radius)
        .arc_to(center.x - radius, center.y, radius, radius)
        .build()
}

/// Sum of the winding numbers of all rings around `point`.
fn winding_number(rings: &[Vec<DVec2>], point: DVec2) -> i32 {
    let mut winding = 0;
    for ring in rings {
        for (i, &a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            let cross = (b.x - a.x) * (point.y - a.y) - (point.x - a.x) * (b.y - a.y);
            if a.y <= point.y {
                if b.y > point.y && cross > 0.0 {
                    winding += 1;
                }
            } else if b.y <= point.y && cross < 0.0 {
                winding -= 1;
            }
        }
    }
    winding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rect_path() {
        let path = RoundRect::new(0.0, 0.0, 10.0, 5.0).to_path();
        assert_eq!(path.to_svg_data(), "M0,0 L10,0 L10,5 L0,5 Z");
    }

    #[test]
    fn rounded_rect_clamps_arc_to_size() {
        let rect = RoundRect::new(0.0, 0.0, 10.0, 4.0).with_arc(20.0, 20.0);
        let path = rect.to_path();
        // radii capped to half the width and half the height
        assert_eq!(
            path.to_svg_data(),
            "M5,0 L5,0 A5,2 0 0 1 10,2 L10,2 A5,2 0 0 1 5,4 L5,4 A5,2 0 0 1 0,2 L0,2 A5,2 0 0 1 5,0 Z"
        );
    }

    #[test]
    fn rotated_rect_swaps_extent() {
        let rect = RoundRect::new(-10.0, -2.0, 20.0, 4.0).with_rotate(90.0);
        let (min, max) = Outline::Rect(rect).bounds().unwrap();
        assert!((min - dvec2(-2.0, -10.0)).length() < 1e-9);
        assert!((max - dvec2(2.0, 10.0)).length() < 1e-9);
    }

    #[test]
    fn rotation_adds_to_arc_axis() {
        let rect = RoundRect::new(0.0, 0.0, 4.0, 4.0)
            .with_arc(2.0, 2.0)
            .with_rotate(30.0);
        let path = rect.to_path();
        assert!(path.commands().iter().any(|c| matches!(
            c,
            PathCommand::ArcTo { x_axis_rotation, .. } if (*x_axis_rotation - 30.0).abs() < 1e-12
        )));
    }

    #[test]
    fn contains_follows_composition() {
        let outer = Outline::circle(DVec2::ZERO, 10.0);
        let inner = Outline::circle(DVec2::ZERO, 4.0);
        let ring = Outline::subtract(outer.clone(), inner.clone());
        assert!(ring.contains(dvec2(7.0, 0.0)));
        assert!(!ring.contains(DVec2::ZERO));
        assert!(!ring.contains(dvec2(11.0, 0.0)));

        let both = Outline::intersect(outer.clone(), Outline::circle(dvec2(10.0, 0.0), 10.0));
        assert!(both.contains(dvec2(5.0, 0.0)));
        assert!(!both.contains(dvec2(-5.0, 0.0)));

        let either = Outline::union(outer, Outline::circle(dvec2(30.0, 0.0), 1.0));
        assert!(either.contains(dvec2(30.0, 0.5)));
        assert_eq!(either.primitive_count(), 2);
    }

    #[test]
    fn path_contains_uses_nonzero_rule() {
        let tri = PathBuilder::new()
            .move_to(0.0, 0.0)
            .line_to(10.0, 0.0)
            .line_to(0.0, 10.0)
            .build();
        let outline = Outline::from(tri);
        assert!(outline.contains(dvec2(2.0, 2.0)));
        assert!(!outline.contains(dvec2(8.0, 8.0)));
    }

    #[test]
    fn circle_path_bounds_match_circle() {
        let path = Outline::circle(dvec2(50.0, 50.0), 20.0).to_path().unwrap();
        let (min, max) = Outline::Path(path).bounds().unwrap();
        assert!((min - dvec2(30.0, 30.0)).length() < 0.05);
        assert!((max - dvec2(70.0, 70.0)).length() < 0.05);
    }

    #[test]
    fn disjoint_intersection_has_no_bounds() {
        let a = Outline::circle(DVec2::ZERO, 1.0);
        let b = Outline::circle(dvec2(10.0, 0.0), 1.0);
        assert_eq!(Outline::intersect(a, b).bounds(), None);
    }
}
