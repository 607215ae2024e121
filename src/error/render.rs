//! Render error module.
//!
//! Errors raised by the rendering side channel: MIME resolution and the external
//! renderer process.

use thiserror::Error;

/// Errors that can occur while preparing or running a render.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The requested screenshot type has no known MIME type.
    #[error("Unknown screenshot type: {0}")]
    UnknownType(String),

    /// Neither `url` nor `html` was supplied.
    #[error("Render requires a url or html source")]
    MissingSource,

    /// No renderer program is configured.
    #[error("No renderer program configured")]
    Unavailable,

    /// The renderer process could not be spawned or driven.
    #[error("Renderer process error: {0}")]
    Process(#[from] std::io::Error),

    /// The renderer exited unsuccessfully.
    #[error("Renderer exited with status {status}: {stderr}")]
    Failed {
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// The renderer did not finish in time.
    #[error("Renderer timed out after {0} ms")]
    Timeout(u64),
}
