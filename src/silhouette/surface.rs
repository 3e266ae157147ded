//! Surfaces: where published outlines end up.
//!
//! A silhouette never draws. It hands its outline and appearance to an
//! attached [`Surface`], which owns whatever retained-mode object the host
//! toolkit uses. [`SvgSurface`] is the built-in implementation and renders
//! to an SVG fragment.

use std::fmt::Write as _;

use crate::geometry::Outline;
use crate::geometry::path_builder::fmt_num;

use super::appearance::Appearance;

/// Receiver of a silhouette's published outline.
pub trait Surface: Send {
    /// A new outline was computed.
    fn present(&mut self, outline: &Outline, appearance: &Appearance, style_class: &str);

    /// Visual attributes changed; the outline did not.
    fn restyle(&mut self, appearance: &Appearance);
}

/// Renders the current outline as an SVG element.
#[derive(Debug, Default)]
pub struct SvgSurface {
    id_prefix: String,
    outline: Option<Outline>,
    style_class: String,
    element: Option<String>,
    presented: usize,
}

impl SvgSurface {
    /// `id_prefix` keeps generated clip path ids unique within a document.
    pub fn new(id_prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            ..Default::default()
        }
    }

    /// The rendered element, once something has been presented.
    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    /// How many outlines have been presented so far.
    pub fn presented(&self) -> usize {
        self.presented
    }

    fn render(&mut self, appearance: &Appearance) {
        let Some(outline) = &self.outline else {
            return;
        };
        let mut out = String::new();
        let mut clips = ClipIds {
            prefix: &self.id_prefix,
            next: 0,
        };
        let attrs = presentation_attributes(outline, appearance, &self.style_class);
        write_outline(&mut out, outline, &attrs, &mut clips);
        self.element = Some(out);
    }
}

impl Surface for SvgSurface {
    fn present(&mut self, outline: &Outline, appearance: &Appearance, style_class: &str) {
        self.outline = Some(outline.clone());
        self.style_class = style_class.to_string();
        self.presented += 1;
        self.render(appearance);
    }

    fn restyle(&mut self, appearance: &Appearance) {
        self.render(appearance);
    }
}

/// Wrap rendered elements into a standalone SVG document.
pub fn svg_document<S: AsRef<str>>(width: f64, height: f64, elements: &[S]) -> String {
    let mut out = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
        w = fmt_num(width),
        h = fmt_num(height)
    );
    for element in elements {
        out.push_str(element.as_ref());
    }
    out.push_str("</svg>");
    out
}

// ============================================================================
// Rendering
// ============================================================================

struct ClipIds<'a> {
    prefix: &'a str,
    next: usize,
}

impl ClipIds<'_> {
    fn allocate(&mut self) -> String {
        self.next += 1;
        if self.prefix.is_empty() {
            format!("clip{}", self.next)
        } else {
            format!("{}-clip{}", self.prefix, self.next)
        }
    }
}

fn presentation_attributes(outline: &Outline, appearance: &Appearance, class: &str) -> String {
    let mut attrs = String::new();
    let _ = write!(
        attrs,
        r#" class="{}" fill="{}" stroke="{}" stroke-width="{}" stroke-linecap="{}" stroke-linejoin="{}" stroke-miterlimit="{}""#,
        class,
        appearance.fill,
        appearance.stroke,
        fmt_num(appearance.stroke_width),
        appearance.stroke_line_cap.as_svg(),
        appearance.stroke_line_join.as_svg(),
        fmt_num(appearance.stroke_miter_limit),
    );
    if appearance.stroke_dash_offset != 0.0 {
        let _ = write!(
            attrs,
            r#" stroke-dashoffset="{}""#,
            fmt_num(appearance.stroke_dash_offset)
        );
    }
    if appearance.opacity != 1.0 {
        let _ = write!(attrs, r#" opacity="{}""#, fmt_num(appearance.opacity));
    }
    if !appearance.visible {
        attrs.push_str(r#" visibility="hidden""#);
    }
    if let Some(id) = &appearance.id {
        let _ = write!(attrs, r#" id="{}""#, id);
    }
    if let Some(style) = &appearance.style {
        let _ = write!(attrs, r#" style="{}""#, style);
    }
    if appearance.has_transform() {
        let mut transform = String::new();
        if appearance.translate != glam::DVec2::ZERO {
            let _ = write!(
                transform,
                "translate({},{}) ",
                fmt_num(appearance.translate.x),
                fmt_num(appearance.translate.y)
            );
        }
        if appearance.rotate != 0.0 {
            let pivot = outline
                .bounds()
                .map(|(min, max)| (min + max) / 2.0)
                .unwrap_or_default();
            let _ = write!(
                transform,
                "rotate({} {} {}) ",
                fmt_num(appearance.rotate),
                fmt_num(pivot.x),
                fmt_num(pivot.y)
            );
        }
        if appearance.scale != glam::DVec2::ONE {
            let _ = write!(
                transform,
                "scale({},{})",
                fmt_num(appearance.scale.x),
                fmt_num(appearance.scale.y)
            );
        }
        let _ = write!(attrs, r#" transform="{}""#, transform.trim_end());
    }
    attrs
}

/// Path data for everything that can be drawn as one `<path>`.
///
/// Unions and differences concatenate their operands; intersections need a
/// clip path and yield `None`.
fn path_data(outline: &Outline) -> Option<String> {
    match outline {
        Outline::Union(a, b) | Outline::Difference(a, b) => {
            Some(format!("{} {}", path_data(a)?, path_data(b)?))
        }
        Outline::Intersection(..) => None,
        primitive => primitive.to_path().map(|p| p.to_svg_data()),
    }
}

fn write_outline(out: &mut String, outline: &Outline, attrs: &str, clips: &mut ClipIds<'_>) {
    if let Some(d) = path_data(outline) {
        let rule = if matches!(outline, Outline::Difference(..)) {
            "evenodd"
        } else {
            "nonzero"
        };
        let _ = write!(out, r#"<path d="{}" fill-rule="{}"{}/>"#, d, rule, attrs);
        return;
    }

    match outline {
        Outline::Intersection(a, b) => {
            let id = clips.allocate();
            let _ = write!(out, r#"<defs><clipPath id="{}">"#, id);
            write_outline(out, b, "", clips);
            let _ = write!(out, r#"</clipPath></defs><g clip-path="url(#{})">"#, id);
            write_outline(out, a, attrs, clips);
            out.push_str("</g>");
        }
        Outline::Union(a, b) | Outline::Difference(a, b) => {
            // One operand contains an intersection; draw both operands separately
            let _ = write!(out, "<g{}>", attrs);
            write_outline(out, a, "", clips);
            write_outline(out, b, "", clips);
            out.push_str("</g>");
        }
        _ => {}
    }
}
