//! Rectangle with an individually rounded corner at each vertex.

use crate::log::info;

use super::{ShapeState, Silhouette, shape_params};
use crate::geometry::{Outline, PathBuilder};

/// Horizontal and vertical inset of one rounded corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Corner {
    pub width: f64,
    pub height: f64,
}

impl Corner {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Circular corner.
    pub const fn round(radius: f64) -> Self {
        Self::new(radius, radius)
    }
}

/// Corner insets of a [`MultiRoundRectangle`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CornerRadii {
    pub top_left: Corner,
    pub top_right: Corner,
    pub bottom_left: Corner,
    pub bottom_right: Corner,
}

impl CornerRadii {
    /// Same circular radius on all four corners.
    pub const fn uniform(radius: f64) -> Self {
        Self::per_corner(radius, radius, radius, radius)
    }

    /// One circular radius per corner.
    pub const fn per_corner(top_left: f64, top_right: f64, bottom_left: f64, bottom_right: f64) -> Self {
        Self {
            top_left: Corner::round(top_left),
            top_right: Corner::round(top_right),
            bottom_left: Corner::round(bottom_left),
            bottom_right: Corner::round(bottom_right),
        }
    }
}

/// Rectangle `(x, y, width, height)` with four independent elliptical corners.
///
/// When the two insets along a side add up to more than that side, both
/// insets of that side are dropped (the corners become sharp). Sides are
/// checked bottom, left, right, top.
#[derive(Debug, Default)]
pub struct MultiRoundRectangle {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    top_left_width: f64,
    top_left_height: f64,
    top_right_width: f64,
    top_right_height: f64,
    bottom_left_width: f64,
    bottom_left_height: f64,
    bottom_right_width: f64,
    bottom_right_height: f64,
    state: ShapeState,
}

impl MultiRoundRectangle {
    pub fn new(x: f64, y: f64, width: f64, height: f64, corners: CornerRadii) -> Self {
        let mut rect = Self {
            x,
            y,
            width,
            height,
            state: ShapeState::default(),
            ..Default::default()
        };
        rect.apply_corners(corners);
        rect.recompute();
        rect
    }

    /// Uniformly rounded rectangle.
    pub fn uniform(x: f64, y: f64, width: f64, height: f64, round: f64) -> Self {
        Self::new(x, y, width, height, CornerRadii::uniform(round))
    }

    pub fn corners(&self) -> CornerRadii {
        CornerRadii {
            top_left: Corner::new(self.top_left_width, self.top_left_height),
            top_right: Corner::new(self.top_right_width, self.top_right_height),
            bottom_left: Corner::new(self.bottom_left_width, self.bottom_left_height),
            bottom_right: Corner::new(self.bottom_right_width, self.bottom_right_height),
        }
    }

    /// Replace all eight insets with a single recomputation.
    pub fn set_corners(&mut self, corners: CornerRadii) {
        self.apply_corners(corners);
        self.invalidate();
    }

    fn apply_corners(&mut self, corners: CornerRadii) {
        self.top_left_width = corners.top_left.width;
        self.top_left_height = corners.top_left.height;
        self.top_right_width = corners.top_right.width;
        self.top_right_height = corners.top_right.height;
        self.bottom_left_width = corners.bottom_left.width;
        self.bottom_left_height = corners.bottom_left.height;
        self.bottom_right_width = corners.bottom_right.width;
        self.bottom_right_height = corners.bottom_right.height;
    }
}

shape_params!(MultiRoundRectangle {
    x: f64 => set_x,
    y: f64 => set_y,
    width: f64 => set_width,
    height: f64 => set_height,
    top_left_width: f64 => set_top_left_width,
    top_left_height: f64 => set_top_left_height,
    top_right_width: f64 => set_top_right_width,
    top_right_height: f64 => set_top_right_height,
    bottom_left_width: f64 => set_bottom_left_width,
    bottom_left_height: f64 => set_bottom_left_height,
    bottom_right_width: f64 => set_bottom_right_width,
    bottom_right_height: f64 => set_bottom_right_height,
});

/// Drop both insets of a side whose insets overlap.
fn fit_side(side: &str, a: &mut f64, b: &mut f64, length: f64) {
    if *a + *b > length {
        info!(side, first = *a, second = *b, length, "rounding insets exceed side, dropping");
        *a = 0.0;
        *b = 0.0;
    }
}

impl Silhouette for MultiRoundRectangle {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn compute(&self) -> Outline {
        let (x, y, w, h) = (self.x, self.y, self.width, self.height);
        let CornerRadii {
            top_left: mut tl,
            top_right: mut tr,
            bottom_left: mut bl,
            bottom_right: mut br,
        } = self.corners();

        fit_side("bottom", &mut bl.width, &mut br.width, w);
        fit_side("left", &mut tl.height, &mut bl.height, h);
        fit_side("right", &mut tr.height, &mut br.height, h);
        fit_side("top", &mut tl.width, &mut tr.width, w);

        let rounded = |c: Corner| c.width > 0.0 && c.height > 0.0;
        let mut builder = PathBuilder::new();

        if rounded(tl) {
            builder
                .move_to(x, y + tl.height)
                .arc_to(x + tl.width, y, tl.width, tl.height);
        } else {
            builder.move_to(x, y);
        }

        if rounded(tr) {
            builder
                .line_to(x + w - tr.width, y)
                .arc_to(x + w, y + tr.height, tr.width, tr.height);
        } else {
            builder.line_to(x + w, y);
        }

        if rounded(br) {
            builder
                .line_to(x + w, y + h - br.height)
                .arc_to(x + w - br.width, y + h, br.width, br.height);
        } else {
            builder.line_to(x + w, y + h);
        }

        if rounded(bl) {
            builder
                .line_to(x + bl.width, y + h)
                .arc_to(x, y + h - bl.height, bl.width, bl.height);
        } else {
            builder.line_to(x, y + h);
        }

        builder.build().into()
    }

    fn style_class(&self) -> &'static str {
        "multi-round-rectangle"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svg(rect: &MultiRoundRectangle) -> String {
        rect.shape()
            .and_then(Outline::to_path)
            .map(|p| p.to_svg_data())
            .unwrap_or_default()
    }

    #[test]
    fn uniform_corners() {
        let rect = MultiRoundRectangle::uniform(0.0, 0.0, 100.0, 50.0, 10.0);
        insta::assert_snapshot!(svg(&rect), @"M0,10 A10,10 0 0 1 10,0 L90,0 A10,10 0 0 1 100,10 L100,40 A10,10 0 0 1 90,50 L10,50 A10,10 0 0 1 0,40 Z");
    }

    #[test]
    fn sharp_corners_when_zero() {
        let rect = MultiRoundRectangle::new(
            5.0,
            5.0,
            10.0,
            10.0,
            CornerRadii::per_corner(0.0, 2.0, 0.0, 0.0),
        );
        insta::assert_snapshot!(svg(&rect), @"M5,5 L13,5 A2,2 0 0 1 15,7 L15,15 L5,15 Z");
    }

    #[test]
    fn overlapping_top_insets_reset_only_top_pair() {
        // top widths 30 + 30 exceed the width of 50
        let rect = MultiRoundRectangle::new(
            0.0,
            0.0,
            50.0,
            50.0,
            CornerRadii::per_corner(30.0, 30.0, 5.0, 5.0),
        );
        let data = svg(&rect);
        // top corners are sharp, bottom corners keep their arcs
        assert!(data.starts_with("M0,0 L50,0 L50,45 A5,5"));
        assert_eq!(data.matches('A').count(), 2);
        // stored values untouched
        assert_eq!(rect.top_left_width(), 30.0);
    }

    #[test]
    fn single_inset_setter_recomputes() {
        let mut rect = MultiRoundRectangle::uniform(0.0, 0.0, 20.0, 20.0, 0.0);
        rect.set_bottom_right_width(4.0);
        // height still zero, corner stays sharp
        assert_eq!(svg(&rect).matches('A').count(), 0);
        rect.set_bottom_right_height(4.0);
        assert_eq!(svg(&rect).matches('A').count(), 1);
        assert_eq!(rect.corners().bottom_right, Corner::round(4.0));
    }
}
