//! Error type for the HDL writers.

use hdlgen_common::RtlError;

/// Errors raised while rendering a design.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The model could not be rendered: naming failed, or an object has a
    /// type the backend cannot declare.
    #[error(transparent)]
    Rtl(#[from] RtlError),

    /// The output sink failed.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for writer results.
pub type WriteResult<T> = Result<T, WriteError>;
