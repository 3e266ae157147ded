//! Single-path glyph silhouettes: lauburu, pin, arrow, almond, astroid.

use glam::dvec2;
use strum::{AsRefStr, Display, EnumString, VariantNames};

use super::validate::unit_or_default;
use super::{ShapeState, Silhouette, shape_params};
use crate::geometry::{Outline, PathBuilder};

/// Turning direction of a [`Lauburu`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    #[default]
    Clockwise,
    Anticlockwise,
}

// ============================================================================
// Lauburu
// ============================================================================

/// Four comma-shaped heads around the center (the Basque cross).
#[derive(Debug, Default)]
pub struct Lauburu {
    cx: f64,
    cy: f64,
    radius: f64,
    direction: Direction,
    state: ShapeState,
}

impl Lauburu {
    pub fn new(cx: f64, cy: f64, radius: f64) -> Self {
        Self::with_direction(cx, cy, radius, Direction::Clockwise)
    }

    pub fn with_direction(cx: f64, cy: f64, radius: f64, direction: Direction) -> Self {
        let mut lauburu = Self {
            cx,
            cy,
            radius,
            direction,
            state: ShapeState::default(),
        };
        lauburu.recompute();
        lauburu
    }
}

shape_params!(Lauburu {
    cx: f64 => set_cx,
    cy: f64 => set_cy,
    radius: f64 => set_radius,
    direction: Direction => set_direction,
});

impl Silhouette for Lauburu {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn compute(&self) -> Outline {
        let (cx, cy, r) = (self.cx, self.cy, self.radius);
        let cw = self.direction == Direction::Clockwise;
        let heads = [
            (dvec2(cx + r, cy), dvec2(cx + r / 2.0, cy)),
            (dvec2(cx - r, cy), dvec2(cx - r / 2.0, cy)),
            (dvec2(cx, cy + r), dvec2(cx, cy + r / 2.0)),
            (dvec2(cx, cy - r), dvec2(cx, cy - r / 2.0)),
        ];

        let mut builder = PathBuilder::new();
        builder.move_to(cx, cy);
        for (tip, neck) in heads {
            builder
                .arc_to_with(tip.x, tip.y, r / 2.0, r / 2.0, cw, false)
                .arc_to_with(neck.x, neck.y, r / 4.0, r / 4.0, cw, false)
                .arc_to_with(cx, cy, r / 4.0, r / 4.0, !cw, false)
                .close();
        }
        builder.build().into()
    }

    fn style_class(&self) -> &'static str {
        "lauburu"
    }
}

// ============================================================================
// RoundPin
// ============================================================================

/// Map-pin: a half circle on top of a triangle pointing down.
#[derive(Debug, Default)]
pub struct RoundPin {
    cx: f64,
    cy: f64,
    radius: f64,
    height: f64,
    state: ShapeState,
}

impl RoundPin {
    /// Pin whose point sits one diameter below the center.
    pub fn new(cx: f64, cy: f64, radius: f64) -> Self {
        Self::with_height(cx, cy, radius, radius * 2.0)
    }

    pub fn with_height(cx: f64, cy: f64, radius: f64, height: f64) -> Self {
        let mut pin = Self {
            cx,
            cy,
            radius,
            height,
            state: ShapeState::default(),
        };
        pin.recompute();
        pin
    }
}

shape_params!(RoundPin {
    cx: f64 => set_cx,
    cy: f64 => set_cy,
    radius: f64 => set_radius,
    height: f64 => set_height,
});

impl Silhouette for RoundPin {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn compute(&self) -> Outline {
        let (cx, cy, r) = (self.cx, self.cy, self.radius);
        PathBuilder::new()
            .move_to(cx - r, cy)
            .arc_to(cx + r, cy, r, r)
            .line_to(cx, cy + self.height)
            .build()
            .into()
    }

    fn style_class(&self) -> &'static str {
        "round-pin"
    }
}

// ============================================================================
// Arrow
// ============================================================================

/// Block arrow pointing right inside the box `(x, y, width, height)`.
///
/// `depth` is the share of the width taken by the shaft, `rise` the share of
/// the height taken by the shaft's thickness. Values outside `[0, 1]` fall
/// back to 0.5.
#[derive(Debug)]
pub struct Arrow {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    depth: f64,
    rise: f64,
    state: ShapeState,
}

impl Default for Arrow {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            depth: Arrow::DEFAULT_RATIO,
            rise: Arrow::DEFAULT_RATIO,
            state: ShapeState::default(),
        }
    }
}

impl Arrow {
    pub const DEFAULT_RATIO: f64 = 0.5;

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::with_ratios(x, y, width, height, Self::DEFAULT_RATIO, Self::DEFAULT_RATIO)
    }

    pub fn with_ratios(x: f64, y: f64, width: f64, height: f64, depth: f64, rise: f64) -> Self {
        let mut arrow = Self {
            x,
            y,
            width,
            height,
            depth,
            rise,
            state: ShapeState::default(),
        };
        arrow.recompute();
        arrow
    }
}

shape_params!(Arrow {
    x: f64 => set_x,
    y: f64 => set_y,
    width: f64 => set_width,
    height: f64 => set_height,
    depth: f64 => set_depth,
    rise: f64 => set_rise,
});

impl Silhouette for Arrow {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn compute(&self) -> Outline {
        let depth = unit_or_default("Arrow", "depth", self.depth, Self::DEFAULT_RATIO);
        let rise = unit_or_default("Arrow", "rise", self.rise, Self::DEFAULT_RATIO);
        let (x, y, w, h) = (self.x, self.y, self.width, self.height);
        let d = w * depth;
        let r = h * rise / 2.0;
        let mid = y + h / 2.0;

        PathBuilder::new()
            .move_to(x, mid - r)
            .line_to(x + d, mid - r)
            .line_to(x + d, y)
            .line_to(x + w, mid)
            .line_to(x + d, y + h)
            .line_to(x + d, mid + r)
            .line_to(x, mid + r)
            .build()
            .into()
    }

    fn style_class(&self) -> &'static str {
        "arrow"
    }
}

// ============================================================================
// Almond
// ============================================================================

/// Lens formed by two circles of `radius` whose centers are `radius` apart.
#[derive(Debug, Default)]
pub struct Almond {
    cx: f64,
    cy: f64,
    radius: f64,
    state: ShapeState,
}

impl Almond {
    pub fn new(cx: f64, cy: f64, radius: f64) -> Self {
        let mut almond = Self {
            cx,
            cy,
            radius,
            state: ShapeState::default(),
        };
        almond.recompute();
        almond
    }
}

shape_params!(Almond {
    cx: f64 => set_cx,
    cy: f64 => set_cy,
    radius: f64 => set_radius,
});

impl Silhouette for Almond {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn compute(&self) -> Outline {
        let half = self.radius / 2.0;
        Outline::intersect(
            Outline::circle(dvec2(self.cx - half, self.cy), self.radius),
            Outline::circle(dvec2(self.cx + half, self.cy), self.radius),
        )
    }

    fn style_class(&self) -> &'static str {
        "almond"
    }
}

// ============================================================================
// Astroid
// ============================================================================

/// Four-cusped star of concave quarter arcs.
#[derive(Debug, Default)]
pub struct Astroid {
    cx: f64,
    cy: f64,
    radius: f64,
    state: ShapeState,
}

impl Astroid {
    pub fn new(cx: f64, cy: f64, radius: f64) -> Self {
        let mut astroid = Self {
            cx,
            cy,
            radius,
            state: ShapeState::default(),
        };
        astroid.recompute();
        astroid
    }
}

shape_params!(Astroid {
    cx: f64 => set_cx,
    cy: f64 => set_cy,
    radius: f64 => set_radius,
});

impl Silhouette for Astroid {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn compute(&self) -> Outline {
        let (cx, cy, r) = (self.cx, self.cy, self.radius);
        PathBuilder::new()
            .move_to(cx - r, cy)
            .arc_to_with(cx, cy - r, r, r, false, false)
            .arc_to_with(cx + r, cy, r, r, false, false)
            .arc_to_with(cx, cy + r, r, r, false, false)
            .arc_to_with(cx - r, cy, r, r, false, false)
            .build()
            .into()
    }

    fn style_class(&self) -> &'static str {
        "astroid"
    }
}
