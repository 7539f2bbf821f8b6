use std::path::PathBuf;

use thiserror::Error;

/// Library error type for display surface operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A background description named a media kind the surface cannot show.
    #[error("unsupported background kind: {}", path.display())]
    UnsupportedBackground { path: PathBuf },

    /// The UI thread has exited and no longer accepts messages.
    #[error("UI thread is no longer running")]
    UiThreadClosed,

    /// The UI thread panicked before it could be joined.
    #[error("UI thread panicked")]
    UiThreadPanicked,

    /// The UI thread did not answer a request in time.
    #[error("UI thread did not reply within the configured timeout")]
    UiThreadTimeout,

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),

    /// Malformed control message.
    #[error(transparent)]
    Protocol(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
