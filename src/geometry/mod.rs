//! Procedural path geometry: the builder, polar helpers and outlines.

pub mod angles;
pub mod outline;
pub mod path_builder;

pub use angles::{advance, normalize_angle, quadrant_point};
pub use outline::{Outline, RoundRect, rotate_path};
pub use path_builder::{Path, PathBuilder, PathCommand};
