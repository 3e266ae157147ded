//! Visual attributes a silhouette forwards to its surface.

use glam::DVec2;

use crate::types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeLineCap {
    #[default]
    Square,
    Butt,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeLineJoin {
    #[default]
    Miter,
    Bevel,
    Round,
}

/// Where the stroke sits relative to the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeType {
    Inside,
    #[default]
    Centered,
    Outside,
}

/// Attributes that do not affect the outline itself.
///
/// Defaults: black fill and stroke, 1.0 stroke width, square caps, miter
/// joins with limit 10, full opacity, identity transform, visible.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
    pub stroke_type: StrokeType,
    pub stroke_line_cap: StrokeLineCap,
    pub stroke_line_join: StrokeLineJoin,
    pub stroke_miter_limit: f64,
    pub stroke_dash_offset: f64,
    pub opacity: f64,
    /// Clockwise rotation in degrees about the outline's center.
    pub rotate: f64,
    pub scale: DVec2,
    pub translate: DVec2,
    pub visible: bool,
    pub smooth: bool,
    pub id: Option<String>,
    /// Inline style forwarded verbatim.
    pub style: Option<String>,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            stroke_width: 1.0,
            stroke_type: StrokeType::Centered,
            stroke_line_cap: StrokeLineCap::Square,
            stroke_line_join: StrokeLineJoin::Miter,
            stroke_miter_limit: 10.0,
            stroke_dash_offset: 0.0,
            opacity: 1.0,
            rotate: 0.0,
            scale: DVec2::ONE,
            translate: DVec2::ZERO,
            visible: true,
            smooth: true,
            id: None,
            style: None,
        }
    }
}

impl Appearance {
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_stroke(mut self, stroke: Color, width: f64) -> Self {
        self.stroke = stroke;
        self.stroke_width = width;
        self
    }

    /// Whether any transform attribute differs from identity.
    pub fn has_transform(&self) -> bool {
        self.rotate != 0.0 || self.scale != DVec2::ONE || self.translate != DVec2::ZERO
    }
}

impl StrokeLineCap {
    pub fn as_svg(self) -> &'static str {
        match self {
            StrokeLineCap::Square => "square",
            StrokeLineCap::Butt => "butt",
            StrokeLineCap::Round => "round",
        }
    }
}

impl StrokeLineJoin {
    pub fn as_svg(self) -> &'static str {
        match self {
            StrokeLineJoin::Miter => "miter",
            StrokeLineJoin::Bevel => "bevel",
            StrokeLineJoin::Round => "round",
        }
    }
}
