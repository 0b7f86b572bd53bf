//! The renderer boundary used by the preview server

use crate::error::{ConstructionError, GenerationError};
use crate::types::{OutputFormat, ReportError};
use serde_json::Value;

/// Builds reports from a definition and its data
pub trait Renderer: Send + Sync {
    fn new_report(
        &self,
        definition: &Value,
        data: &Value,
        is_sample: bool,
    ) -> Result<Box<dyn Report>, ConstructionError>;
}

/// A report ready to be rendered
pub trait Report: Send + Sync {
    /// Problems with the definition itself, empty when there are none
    fn validation_errors(&self) -> &[ReportError];

    fn render_pdf(&self) -> Result<Vec<u8>, GenerationError>;

    fn render_spreadsheet(&self) -> Result<Vec<u8>, GenerationError>;

    fn render(&self, format: OutputFormat) -> Result<Vec<u8>, GenerationError> {
        match format {
            OutputFormat::Pdf => self.render_pdf(),
            OutputFormat::Xlsx => self.render_spreadsheet(),
        }
    }
}
