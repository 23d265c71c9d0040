// SPDX-License-Identifier: MPL-2.0

//! Error types for the preview pipeline

use std::fmt;

/// Result type alias using ViewportError
pub type ViewportResult<T> = Result<T, ViewportError>;

/// Errors reported synchronously by the pipeline API
///
/// Transient conditions (a momentarily missing surface, an exhausted pool,
/// an interrupted wait during shutdown) are not represented here; the
/// pipeline logs and continues instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewportError {
    /// Geometry change attempted while the pipeline is running
    NotStopped,
    /// Activation attempted before any geometry was set
    NoGeometry,
    /// Requested dimensions are unusable
    InvalidSize(String),
    /// Posted frame failed validation
    InvalidFrame(String),
}

impl fmt::Display for ViewportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewportError::NotStopped => {
                write!(f, "Geometry can only be changed while stopped")
            }
            ViewportError::NoGeometry => {
                write!(f, "No geometry set; call set_size before activating")
            }
            ViewportError::InvalidSize(msg) => write!(f, "Invalid size: {}", msg),
            ViewportError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
        }
    }
}

impl std::error::Error for ViewportError {}
