//! Errors raised by edit operations.
//!
//! Every failure leaves the current raster and undo history untouched.
//! An empty undo history is not an error: `undo()` reports it as `false`.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::pipeline::EditKind;

/// Error returned by the edit pipeline, crop engine and overlay compositor.
#[derive(Debug, Error)]
pub enum EditError {
    /// Source bytes could not be decoded.
    #[error("Could not read image: {0}")]
    Decode(#[from] DecodeError),

    /// The result could not be encoded.
    #[error("Could not write image: {0}")]
    Encode(#[from] EncodeError),

    /// A step in the middle of an operation failed, e.g. the background
    /// removal service rejected the request.
    #[error("{0}")]
    Operation(String),

    /// Another operation is still in flight.
    #[error("Busy: {running} is still running")]
    Busy { running: EditKind },

    /// No image has been loaded yet.
    #[error("No image loaded")]
    NoImage,

    /// A caller supplied an argument outside its domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl EditError {
    pub fn operation(message: impl Into<String>) -> Self {
        EditError::Operation(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        EditError::InvalidArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(EditError::NoImage.to_string(), "No image loaded");
        assert_eq!(
            EditError::Busy {
                running: EditKind::RemoveBackground
            }
            .to_string(),
            "Busy: background removal is still running"
        );
        assert_eq!(
            EditError::from(DecodeError::InvalidFormat).to_string(),
            "Could not read image: Invalid or unsupported image format"
        );
    }
}
