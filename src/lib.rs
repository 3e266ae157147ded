//! Toolkit-independent core of a desktop application framework.
//!
//! - [`geometry`] and [`silhouette`]: parametric shapes that compute
//!   renderable outlines and hand them to a [`silhouette::Surface`].
//! - [`tree`]: filterable trees mirroring observable child lists.
//! - [`form`] and [`sheet`]: form records, form tables and property sheets.
//! - [`config`] and [`app`]: configuration store, background executor and
//!   UI-thread dispatch.

pub mod app;
pub mod config;
pub mod errors;
pub mod form;
pub mod geometry;
pub mod log;
pub mod sheet;
pub mod silhouette;
pub mod tree;
pub mod types;

pub use app::AppContext;
pub use config::ConfigStore;
pub use errors::{AppError, ConfigError, ExecutorError};
pub use types::Color;
