//! Silhouettes made of crossing rectangular beams.

use super::validate::{count_within, unit_interval, width_within};
use super::{ShapeState, Silhouette, shape_params};
use crate::geometry::{Outline, RoundRect, advance};

/// Horizontal beam through the center, rounded by `roundness` of its width.
fn beam(cx: f64, cy: f64, radius: f64, width: f64, roundness: f64) -> RoundRect {
    let arc = width * roundness;
    RoundRect::new(cx - radius, cy - width / 2.0, radius * 2.0, width).with_arc(arc, arc)
}

// ============================================================================
// Asterisk
// ============================================================================

/// `beam_count` beams of equal width, rotated evenly over half a turn.
#[derive(Debug)]
pub struct Asterisk {
    cx: f64,
    cy: f64,
    radius: f64,
    width: f64,
    beam_count: i32,
    roundness: f64,
    state: ShapeState,
}

impl Default for Asterisk {
    fn default() -> Self {
        Self {
            cx: 0.0,
            cy: 0.0,
            radius: 0.0,
            width: 0.0,
            beam_count: 3,
            roundness: 0.0,
            state: ShapeState::default(),
        }
    }
}

impl Asterisk {
    /// Three square-ended beams.
    pub fn new(cx: f64, cy: f64, radius: f64, width: f64) -> Self {
        Self::with_beams(cx, cy, radius, width, 3, 0.0)
    }

    pub fn with_beams(
        cx: f64,
        cy: f64,
        radius: f64,
        width: f64,
        beam_count: i32,
        roundness: f64,
    ) -> Self {
        let mut asterisk = Self {
            cx,
            cy,
            radius,
            width,
            beam_count,
            roundness,
            state: ShapeState::default(),
        };
        asterisk.recompute();
        asterisk
    }
}

shape_params!(Asterisk {
    cx: f64 => set_cx,
    cy: f64 => set_cy,
    radius: f64 => set_radius,
    width: f64 => set_width,
    beam_count: i32 => set_beam_count,
    roundness: f64 => set_roundness,
});

impl Silhouette for Asterisk {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn compute(&self) -> Outline {
        let roundness = unit_interval("Asterisk", "roundness", self.roundness);
        let width = width_within("Asterisk", self.width, self.radius);
        let beams = count_within("Asterisk", "beam_count", self.beam_count, 2);

        let step = 180.0 / f64::from(beams);
        let horizontal = beam(self.cx, self.cy, self.radius, width, roundness);
        let mut angle = 0.0;
        let mut next_beam = || {
            let rect = horizontal.with_rotate(angle);
            angle = advance(angle, step);
            rect
        };

        let first = next_beam();
        let second = next_beam();
        let mut outline = Outline::union(first, second);
        for _ in 2..beams {
            outline = Outline::union(outline, next_beam());
        }
        outline
    }

    fn style_class(&self) -> &'static str {
        "asterisk"
    }
}

// ============================================================================
// Cross
// ============================================================================

/// A horizontal and a vertical beam.
#[derive(Debug, Default)]
pub struct Cross {
    cx: f64,
    cy: f64,
    radius: f64,
    width: f64,
    roundness: f64,
    state: ShapeState,
}

impl Cross {
    pub fn new(cx: f64, cy: f64, radius: f64, width: f64) -> Self {
        Self::with_roundness(cx, cy, radius, width, 0.0)
    }

    pub fn with_roundness(cx: f64, cy: f64, radius: f64, width: f64, roundness: f64) -> Self {
        let mut cross = Self {
            cx,
            cy,
            radius,
            width,
            roundness,
            state: ShapeState::default(),
        };
        cross.recompute();
        cross
    }
}

shape_params!(Cross {
    cx: f64 => set_cx,
    cy: f64 => set_cy,
    radius: f64 => set_radius,
    width: f64 => set_width,
    roundness: f64 => set_roundness,
});

impl Silhouette for Cross {
    fn state(&self) -> &ShapeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShapeState {
        &mut self.state
    }

    fn compute(&self) -> Outline {
        let roundness = unit_interval("Cross", "roundness", self.roundness);
        let width = width_within("Cross", self.width, self.radius);
        let arc = width * roundness;
        let (cx, cy, r) = (self.cx, self.cy, self.radius);

        let horizontal = RoundRect::new(cx - r, cy - width / 2.0, r * 2.0, width).with_arc(arc, arc);
        let vertical = RoundRect::new(cx - width / 2.0, cy - r, width, r * 2.0).with_arc(arc, arc);
        Outline::union(horizontal, vertical)
    }

    fn style_class(&self) -> &'static str {
        "cross"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    fn rects(outline: &Outline) -> Vec<RoundRect> {
        match outline {
            Outline::Rect(rect) => vec![*rect],
            Outline::Union(a, b) => {
                let mut all = rects(a);
                all.extend(rects(b));
                all
            }
            other => panic!("unexpected outline {:?}", other),
        }
    }

    #[test]
    fn asterisk_beams_are_rotated_evenly() {
        let asterisk = Asterisk::with_beams(50.0, 50.0, 50.0, 20.0, 4, 0.0);
        let beams = rects(asterisk.shape().unwrap());
        let angles: Vec<f64> = beams.iter().map(|b| b.rotate).collect();
        assert_eq!(angles, vec![0.0, 45.0, 90.0, 135.0]);
        for b in &beams {
            assert_eq!((b.x, b.y, b.width, b.height), (0.0, 40.0, 100.0, 20.0));
            assert_eq!(b.center(), dvec2(50.0, 50.0));
        }
    }

    #[test]
    fn asterisk_clamps_inputs() {
        let wild = Asterisk::with_beams(0.0, 0.0, 10.0, 50.0, 1, 3.0);
        let beams = rects(wild.shape().unwrap());
        assert_eq!(beams.len(), 2);
        assert_eq!(beams[0].height, 20.0);
        assert_eq!(beams[0].arc_width, 20.0);
    }

    #[test]
    fn asterisk_covers_diagonal_with_three_beams() {
        let asterisk = Asterisk::new(0.0, 0.0, 10.0, 2.0);
        let outline = asterisk.shape().unwrap();
        assert!(outline.contains(dvec2(9.0, 0.0)));
        // 60 degree beam, clockwise on screen
        let p = dvec2(60f64.to_radians().cos(), 60f64.to_radians().sin()) * 8.0;
        assert!(outline.contains(p));
        assert!(!outline.contains(dvec2(0.0, 9.0)));
    }

    #[test]
    fn cross_is_two_perpendicular_beams() {
        let cross = Cross::with_roundness(50.0, 50.0, 50.0, 20.0, 0.5);
        let beams = rects(cross.shape().unwrap());
        assert_eq!(
            beams,
            vec![
                RoundRect::new(0.0, 40.0, 100.0, 20.0).with_arc(10.0, 10.0),
                RoundRect::new(40.0, 0.0, 20.0, 100.0).with_arc(10.0, 10.0),
            ]
        );
        let outline = cross.shape().unwrap();
        assert!(outline.contains(dvec2(50.0, 95.0)));
        assert!(!outline.contains(dvec2(10.0, 10.0)));
    }
}
