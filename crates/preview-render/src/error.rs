//! Error types for report rendering

use crate::types::ReportError;
use std::fmt;

/// A report could not be built from the given definition and data
#[derive(Debug)]
pub enum ConstructionError {
    InvalidDefinition(String),
    InvalidData(String),
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDefinition(msg) => write!(f, "Invalid report definition: {}", msg),
            Self::InvalidData(msg) => write!(f, "Invalid report data: {}", msg),
        }
    }
}

impl std::error::Error for ConstructionError {}

/// A valid report failed while producing its artifact
#[derive(Debug, Clone)]
pub struct GenerationError {
    pub error: ReportError,
}

impl GenerationError {
    pub fn new(error: ReportError) -> Self {
        Self { error }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Report generation failed: {}", self.error)
    }
}

impl std::error::Error for GenerationError {}

impl From<ReportError> for GenerationError {
    fn from(error: ReportError) -> Self {
        Self::new(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_construction_error_display() {
        let err = ConstructionError::InvalidDefinition("expected an object".to_string());
        assert_eq!(
            format!("{}", err),
            "Invalid report definition: expected an object"
        );
    }

    #[test]
    fn test_generation_error_display() {
        let err = GenerationError::new(
            ReportError::new(json!(12), "content", "errorMsgInvalidExpression").with_info("total"),
        );
        assert_eq!(
            format!("{}", err),
            "Report generation failed: errorMsgInvalidExpression (object 12, field content): total"
        );
    }
}
