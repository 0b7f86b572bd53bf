//! Types shared across the renderer boundary

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Artifact formats a report can be rendered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pdf,
    Xlsx,
}

impl OutputFormat {
    /// Parse the wire value (`pdf` or `xlsx`)
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pdf" => Some(Self::Pdf),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Xlsx => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured problem with a report definition.
///
/// Serialized for the designer so it can select the offending object and
/// highlight the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportError {
    #[serde(default)]
    pub object_id: Value,
    pub field: String,
    pub msg_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl ReportError {
    pub fn new(object_id: Value, field: impl Into<String>, msg_key: impl Into<String>) -> Self {
        Self {
            object_id,
            field: field.into(),
            msg_key: msg_key.into(),
            info: None,
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (object {}, field {})", self.msg_key, self.object_id, self.field)?;
        if let Some(info) = &self.info {
            write!(f, ": {}", info)?;
        }
        Ok(())
    }
}
