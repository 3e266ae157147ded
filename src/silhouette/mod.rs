//! Parametric silhouettes.
//!
//! Each silhouette is a small struct of typed parameters plus a
//! [`ShapeState`]. Changing a parameter recomputes the outline right away and
//! publishes it to the attached [`Surface`], unless a bulk update is open
//! (see [`Silhouette::begin_update`]). Parameters are stored as given and
//! corrected only when the outline is computed, so getters return what the
//! caller set.

use std::fmt;

use enum_dispatch::enum_dispatch;

use crate::geometry::Outline;
use crate::types::Color;

mod appearance;
mod beams;
mod glyphs;
mod radial;
mod rect;
mod surface;
pub mod validate;

pub use appearance::{Appearance, StrokeLineCap, StrokeLineJoin, StrokeType};
pub use beams::{Asterisk, Cross};
pub use glyphs::{Almond, Arrow, Astroid, Direction, Lauburu, RoundPin};
pub use radial::{Donut, Rays, RegularPolygon, Star};
pub use rect::{Corner, CornerRadii, MultiRoundRectangle};
pub use surface::{Surface, SvgSurface, svg_document};

/// Generates a getter and a recomputing setter per parameter.
macro_rules! shape_params {
    ($shape:ty { $($field:ident: $ty:ty => $setter:ident),* $(,)? }) => {
        impl $shape {
            $(
                pub fn $field(&self) -> $ty {
                    self.$field
                }

                pub fn $setter(&mut self, value: $ty) {
                    self.$field = value;
                    $crate::silhouette::Silhouette::invalidate(self);
                }
            )*
        }
    };
}
pub(crate) use shape_params;

// ============================================================================
// Shape state
// ============================================================================

/// Outline, appearance and bookkeeping common to every silhouette.
#[derive(Default)]
pub struct ShapeState {
    outline: Option<Outline>,
    appearance: Appearance,
    initializing: bool,
    revision: u64,
    surface: Option<Box<dyn Surface>>,
}

impl fmt::Debug for ShapeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeState")
            .field("outline", &self.outline)
            .field("appearance", &self.appearance)
            .field("initializing", &self.initializing)
            .field("revision", &self.revision)
            .field("surface", &self.surface.is_some())
            .finish()
    }
}

impl ShapeState {
    pub fn outline(&self) -> Option<&Outline> {
        self.outline.as_ref()
    }

    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    /// Number of times an outline has been published.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_initializing(&self) -> bool {
        self.initializing
    }

    fn publish(&mut self, outline: Outline, style_class: &str) {
        if let Some(surface) = self.surface.as_mut() {
            surface.present(&outline, &self.appearance, style_class);
        }
        self.outline = Some(outline);
        self.revision += 1;
    }

    fn attach(&mut self, mut surface: Box<dyn Surface>, style_class: &str) {
        if let Some(outline) = &self.outline {
            surface.present(outline, &self.appearance, style_class);
        }
        self.surface = Some(surface);
    }

    /// Apply `f` to the appearance and forward the result to the surface,
    /// if an outline has been published.
    pub fn update_appearance(&mut self, f: impl FnOnce(&mut Appearance)) {
        f(&mut self.appearance);
        if self.outline.is_none() {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.restyle(&self.appearance);
        }
    }
}

// ============================================================================
// Silhouette trait
// ============================================================================

/// Common behavior of all silhouettes.
#[enum_dispatch]
pub trait Silhouette {
    fn state(&self) -> &ShapeState;

    fn state_mut(&mut self) -> &mut ShapeState;

    /// Compute the outline from the current (corrected) parameters.
    fn compute(&self) -> Outline;

    /// Style class published alongside the outline.
    fn style_class(&self) -> &'static str;

    /// Compute and publish the outline now.
    fn recompute(&mut self) {
        let outline = self.compute();
        let class = self.style_class();
        self.state_mut().publish(outline, class);
    }

    /// Recompute unless a bulk update is open. Called by every setter.
    fn invalidate(&mut self) {
        if !self.state().is_initializing() {
            self.recompute();
        }
    }

    /// The last published outline; `None` until the first computation.
    fn shape(&self) -> Option<&Outline> {
        self.state().outline()
    }

    fn revision(&self) -> u64 {
        self.state().revision()
    }

    /// Defer recomputation until [`Silhouette::end_update`].
    fn begin_update(&mut self) {
        self.state_mut().initializing = true;
    }

    /// Close a bulk update and compute exactly once.
    fn end_update(&mut self) {
        self.state_mut().initializing = false;
        self.recompute();
    }

    /// Attach a surface; it immediately receives the current outline.
    fn attach_surface(&mut self, surface: Box<dyn Surface>) {
        let class = self.style_class();
        self.state_mut().attach(surface, class);
    }

    fn detach_surface(&mut self) -> Option<Box<dyn Surface>> {
        self.state_mut().surface.take()
    }

    fn appearance(&self) -> &Appearance {
        self.state().appearance()
    }

    fn set_appearance(&mut self, appearance: Appearance) {
        self.state_mut().update_appearance(|a| *a = appearance);
    }

    fn set_fill(&mut self, fill: Color) {
        self.state_mut().update_appearance(|a| a.fill = fill);
    }

    fn set_stroke(&mut self, stroke: Color) {
        self.state_mut().update_appearance(|a| a.stroke = stroke);
    }

    fn set_stroke_width(&mut self, width: f64) {
        self.state_mut().update_appearance(|a| a.stroke_width = width);
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.state_mut().update_appearance(|a| a.opacity = opacity);
    }

    fn set_rotate(&mut self, degrees: f64) {
        self.state_mut().update_appearance(|a| a.rotate = degrees);
    }

    fn set_translate(&mut self, x: f64, y: f64) {
        self.state_mut()
            .update_appearance(|a| a.translate = glam::dvec2(x, y));
    }

    fn set_scale(&mut self, x: f64, y: f64) {
        self.state_mut().update_appearance(|a| a.scale = glam::dvec2(x, y));
    }

    fn set_visible(&mut self, visible: bool) {
        self.state_mut().update_appearance(|a| a.visible = visible);
    }

    fn set_id(&mut self, id: Option<String>) {
        self.state_mut().update_appearance(|a| a.id = id);
    }
}

/// Any silhouette, for heterogeneous collections.
#[enum_dispatch(Silhouette)]
#[derive(Debug)]
pub enum AnySilhouette {
    RegularPolygon,
    Star,
    Rays,
    Asterisk,
    Donut,
    Cross,
    Lauburu,
    RoundPin,
    Arrow,
    Almond,
    Astroid,
    MultiRoundRectangle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls so tests can see what reaches the surface.
    #[derive(Clone, Default)]
    struct CountingSurface {
        presents: Arc<AtomicUsize>,
        restyles: Arc<AtomicUsize>,
    }

    impl Surface for CountingSurface {
        fn present(&mut self, _: &Outline, _: &Appearance, _: &str) {
            self.presents.fetch_add(1, Ordering::SeqCst);
        }

        fn restyle(&mut self, _: &Appearance) {
            self.restyles.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn default_shape_has_no_outline_until_first_setter() {
        let mut polygon = RegularPolygon::default();
        assert!(polygon.shape().is_none());
        polygon.set_radius(10.0);
        assert!(polygon.shape().is_some());
        assert_eq!(polygon.revision(), 1);
    }

    #[test]
    fn bulk_update_computes_once() {
        let mut star = Star::new(0.0, 0.0, 10.0, 4.0, 5);
        assert_eq!(star.revision(), 1);

        star.begin_update();
        star.set_cx(5.0);
        star.set_cy(5.0);
        star.set_sides(7);
        assert_eq!(star.revision(), 1);

        star.end_update();
        assert_eq!(star.revision(), 2);
        assert_eq!(star.shape(), Some(&Star::new(5.0, 5.0, 10.0, 4.0, 7).compute()));
    }

    #[test]
    fn appearance_changes_forward_only_after_outline_exists() {
        let counting = CountingSurface::default();
        let mut pin = RoundPin::default();
        pin.attach_surface(Box::new(counting.clone()));

        pin.set_fill(Color::RED);
        assert_eq!(counting.restyles.load(Ordering::SeqCst), 0);
        assert_eq!(pin.appearance().fill, Color::RED);

        pin.set_radius(5.0);
        assert_eq!(counting.presents.load(Ordering::SeqCst), 1);

        pin.set_stroke_width(3.0);
        pin.set_visible(false);
        assert_eq!(counting.restyles.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn attaching_presents_existing_outline() {
        let counting = CountingSurface::default();
        let mut almond = Almond::new(50.0, 50.0, 50.0);
        almond.attach_surface(Box::new(counting.clone()));
        assert_eq!(counting.presents.load(Ordering::SeqCst), 1);
        assert!(almond.detach_surface().is_some());
        almond.set_radius(10.0);
        assert_eq!(counting.presents.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn any_silhouette_dispatches() {
        let shapes: Vec<AnySilhouette> = vec![
            RegularPolygon::new(0.0, 0.0, 10.0, 6).into(),
            Cross::new(0.0, 0.0, 10.0, 4.0).into(),
            Lauburu::new(0.0, 0.0, 10.0).into(),
        ];
        let classes: Vec<_> = shapes.iter().map(|s| s.style_class()).collect();
        assert_eq!(classes, ["regular-polygon", "cross", "lauburu"]);
        assert!(shapes.iter().all(|s| s.shape().is_some()));
    }
}
