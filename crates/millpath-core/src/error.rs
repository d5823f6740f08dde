//! Error handling for millpath
//!
//! Errors shared by every crate in the workspace:
//! - Out-of-range coordinates handed to the raster model
//! - Malformed input (images, parameters)
//! - I/O failures while writing the command stream
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::data::Point;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// A coordinate fell outside the raster it was meant for
    #[error("Point {point} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// The offending point.
        point: Point,
        /// Grid width in cells.
        width: i32,
        /// Grid height in cells.
        height: i32,
    },

    /// Input data could not be used
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::OutOfBounds {
            point: Point::new(-1, 4),
            width: 10,
            height: 12,
        };
        assert_eq!(err.to_string(), "Point (-1, 4) is outside the 10x12 grid");

        let err = Error::invalid_input("empty image");
        assert_eq!(err.to_string(), "Invalid input: empty image");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
