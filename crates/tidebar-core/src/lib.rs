//! Core library for tidebar: configuration schema, the widget field
//! validator/normalizer, theming helpers, and logging setup.
//!
//! This crate has no GTK dependency so everything here is unit-testable
//! without a display server.

pub mod config;
pub mod error;
pub mod logging;
pub mod schema;
pub mod theme;

pub use config::{Config, ConfigLoadResult, WidgetEntry};
pub use error::{Error, Result};
pub use schema::{FieldDescriptor, Validator};
pub use theme::{SurfaceStyles, ThemePalette};
