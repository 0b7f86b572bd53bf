//! Error types for the preview cache

use crate::types::Handle;
use std::fmt;

#[derive(Debug)]
pub enum CacheError {
    /// A freshly generated handle matched a live row
    HandleCollision(Handle),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::HandleCollision(handle) => {
                write!(f, "Handle collision: {} is already in use", handle)
            }
        }
    }
}

impl std::error::Error for CacheError {}

pub type Result<T> = std::result::Result<T, CacheError>;
