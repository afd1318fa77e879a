//! Error taxonomy for the asset codec.
//!
//! Every failure is fatal for a build run; variants carry enough context
//! (stage, resource, field) to tell the user what to fix.

use std::path::PathBuf;

use crate::tiling::TextureDimension;

/// Error type for encoding, decoding and container assembly.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Source image has the wrong size for the texture it feeds.
    #[error("{texture}: image must be exactly {expected_width}x{expected_height}, got {width}x{height}")]
    Dimension {
        texture: &'static str,
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },

    /// A tile address map or header template is missing or malformed.
    #[error("resource {resource}: {reason}")]
    Resource { resource: String, reason: String },

    /// A resource file could not be read at all.
    #[error("failed to read resource {path:?}: {source}")]
    ResourceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compressor is unavailable or failed.
    #[error("compression with {compressor} failed: {reason}")]
    Compression { compressor: String, reason: String },

    /// A title string does not fit its fixed-width UTF-16 slot.
    #[error("{field} is {units} UTF-16 code units long, field holds at most {capacity}")]
    FieldOverflow {
        field: &'static str,
        units: usize,
        capacity: usize,
    },

    /// Compressed payload is too large for the 32-bit length field.
    #[error("CBMD container of {0} bytes does not fit a 32-bit length")]
    ContainerOverflow(usize),

    /// Input is shorter than the fixed layout being parsed.
    #[error("{what} truncated: need {expected} bytes, got {actual}")]
    Truncated {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl CodecError {
    pub(crate) fn resource(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resource {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn dimension(dimension: TextureDimension, width: u32, height: u32) -> Self {
        Self::Dimension {
            texture: dimension.name(),
            expected_width: dimension.width(),
            expected_height: dimension.height(),
            width,
            height,
        }
    }
}

pub type Result<T, E = CodecError> = std::result::Result<T, E>;
