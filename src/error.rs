//! Error type for operations that report sink failures to the caller.

use std::io;

/// Errors surfaced by explicit progress operations such as [`Progress::refresh`](crate::Progress::refresh).
///
/// Redraws triggered from inside iteration never return errors: a failing sink is
/// logged once and the bar stops drawing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Writing or flushing the progress line to the output sink failed.
    #[error("failed to write progress line to the output sink")]
    Sink(#[from] io::Error),
}

/// Convenience alias for results carrying [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
