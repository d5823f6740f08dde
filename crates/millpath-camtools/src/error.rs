//! Error types for the CAM tools crate.
//!
//! This module provides structured error types for grid construction,
//! target image loading, and toolpath planning.

use std::io;
use thiserror::Error;

/// Errors that can occur during carving operations.
#[derive(Error, Debug)]
pub enum CamToolError {
    /// Invalid parameters were provided to a CAM tool.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The target silhouette could not be decoded.
    #[error("Image processing error: {0}")]
    ImageError(String),

    /// The planner produced an inconsistent route.
    #[error("Planning failed: {0}")]
    PlanningFailed(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Out-of-range coordinates, or a motion sink that rejected a move.
    #[error(transparent)]
    Core(#[from] millpath_core::Error),
}

impl From<image::ImageError> for CamToolError {
    fn from(err: image::ImageError) -> Self {
        CamToolError::ImageError(err.to_string())
    }
}

/// Result type alias for CAM tool operations.
pub type CamToolResult<T> = Result<T, CamToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cam_tool_error_display() {
        let err = CamToolError::InvalidParameters("tool radius must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid parameters: tool radius must be positive"
        );

        let err: CamToolError = millpath_core::Error::OutOfBounds {
            point: millpath_core::Point::new(20, -1),
            width: 20,
            height: 20,
        }
        .into();
        assert_eq!(err.to_string(), "Point (20, -1) is outside the 20x20 grid");
    }

    #[test]
    fn test_error_conversion() {
        let core_err = millpath_core::Error::invalid_input("sink closed");
        let cam_err: CamToolError = core_err.into();
        assert!(matches!(cam_err, CamToolError::Core(_)));
        assert_eq!(cam_err.to_string(), "Invalid input: sink closed");

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let cam_err: CamToolError = io_err.into();
        assert!(matches!(cam_err, CamToolError::IoError(_)));
    }
}
