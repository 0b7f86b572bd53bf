//! Report rendering boundary for the preview server
//!
//! Defines the [`Renderer`] and [`Report`] traits the server renders through,
//! the split between validation errors (returned to the caller as data) and
//! generation errors (request failures), and [`SimpleRenderer`], a small
//! built-in implementation producing PDF and XLSX artifacts.

mod error;
mod pdf;
mod renderer;
mod simple;
mod types;
mod xlsx;

pub use error::{ConstructionError, GenerationError};
pub use renderer::{Renderer, Report};
pub use simple::{SimpleRenderer, SimpleReport};
pub use types::{OutputFormat, ReportError};
