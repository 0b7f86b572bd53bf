//! Report preview server library
//!
//! Provides the submit/fetch protocol over the preview cache and the HTTP
//! surface the designer talks to.

pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod types;

pub use config::Config;
pub use error::{AppError, PreviewError, Result, ServerError};
pub use protocol::PreviewService;
pub use server::{create_router, start_server, ServerState, SharedState};
pub use types::*;
