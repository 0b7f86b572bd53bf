//! Error types for the preview server

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use preview_cache::CacheError;
use preview_render::ReportError;
use serde_json::json;
use std::fmt;

/// Failures of the submit and fetch operations
#[derive(Debug)]
pub enum PreviewError {
    /// `outputFormat` missing or not one of `pdf`/`xlsx`
    InvalidOutputFormat(Option<String>),
    /// The renderer could not build a report from the input
    ReportInit(String),
    /// The handle is unknown, most likely because the preview expired
    NotFound,
    /// A fetch without a handle lacked a definition or data object
    MissingInput,
    /// The definition failed validation where errors are not returned as data
    InvalidReport(Vec<ReportError>),
    /// The renderer failed to produce the artifact
    Generation(ReportError),
    Store(CacheError),
}

impl PreviewError {
    /// Everything except store failures is blamed on the request
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PreviewError::Store(_))
    }

    /// Structured report errors attached to this failure, if any
    pub fn report_errors(&self) -> &[ReportError] {
        match self {
            PreviewError::InvalidReport(errors) => errors,
            PreviewError::Generation(error) => std::slice::from_ref(error),
            _ => &[],
        }
    }
}

impl fmt::Display for PreviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewError::InvalidOutputFormat(format) => write!(
                f,
                "outputFormat parameter missing or invalid (outputFormat={})",
                format.as_deref().unwrap_or("None")
            ),
            PreviewError::ReportInit(msg) => write!(f, "failed to initialize report: {}", msg),
            PreviewError::NotFound => write!(
                f,
                "report not found (preview probably too old), update report preview and try again"
            ),
            PreviewError::MissingInput => write!(f, "report definition or data missing"),
            PreviewError::InvalidReport(_) | PreviewError::Generation(_) => {
                write!(f, "error generating report")
            }
            PreviewError::Store(err) => write!(f, "Cache error: {}", err),
        }
    }
}

impl std::error::Error for PreviewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PreviewError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CacheError> for PreviewError {
    fn from(err: CacheError) -> Self {
        PreviewError::Store(err)
    }
}

/// Application error type that converts to HTTP responses
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<PreviewError> for AppError {
    fn from(err: PreviewError) -> Self {
        if err.is_client_error() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

/// Errors that stop the server from starting
#[derive(Debug)]
pub enum ServerError {
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Io(err) => write!(f, "IO error: {}", err),
            ServerError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Io(err) => Some(err.as_ref()),
            ServerError::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for ServerError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ServerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
