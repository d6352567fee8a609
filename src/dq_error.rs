use crate::protocol::parts::ServerError;
use thiserror::Error;

/// A list specifying categories of [`DqError`](crate::DqError).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DqError {
    /// Database server responded with an error;
    /// the contained `ServerError` describes the concrete reason.
    #[error("Database server responded with an error")]
    Db {
        /// The causing Error.
        #[from]
        source: ServerError,
    },

    /// A wire class id was received for which no decoder is registered.
    ///
    /// This is fatal for the port it occurred on; the port is closed and
    /// not returned to the pool.
    #[error("no class registered for wire class id {}", _0)]
    ClassNotFound(i32),

    /// Protocol framing anomaly, e.g. an unexpected object where a status
    /// was required, or a handshake that did not yield a usable slave id.
    #[error("Interface error: {}", _0)]
    Interface(&'static str),

    /// Protocol framing anomaly, with dynamic details.
    #[error("Interface error: {}", _0)]
    InterfaceDetailed(String),

    /// Erroneous connection parameters, e.g. from a malformed connection URL.
    #[error("Erroneous connection parameters")]
    ConnParams {
        /// The causing Error.
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Error occured in communication with the database.
    #[error(transparent)]
    Io {
        /// The causing Error.
        #[from]
        source: std::io::Error,
    },

    /// Error occured in thread synchronization.
    #[error("Error occured in thread synchronization")]
    Poison,

    /// The requested operation is not available with the negotiated
    /// protocol version or not provided by the server at all.
    #[error("Not supported: {}", _0)]
    NotSupported(&'static str),

    /// Error caused by wrong usage.
    #[error("Wrong usage: {}", _0)]
    Usage(&'static str),

    /// Error caused by wrong usage.
    #[error("Wrong usage: {}", _0)]
    UsageDetailed(String),

    /// An invariant of the library itself was violated.
    #[error("Unexpected error: {}", _0)]
    Unexpected(&'static str),

    /// An invariant of the library itself was violated.
    #[error("Unexpected error: {}", _0)]
    UnexpectedDetailed(String),

    /// A non-fatal condition that the caller may want to surface.
    #[error("Warning: {}", _0)]
    Warning(String),
}

/// Abbreviation of `Result<T, DqError>`.
pub type DqResult<T> = std::result::Result<T, DqError>;

impl DqError {
    /// Returns the contained `ServerError`, if any.
    ///
    /// This method helps in case you need programmatic access to e.g. the
    /// error code or the SQLSTATE the server reported.
    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            Self::Db {
                source: server_error,
            } => Some(server_error),
            _ => None,
        }
    }

    /// Reveal the inner error.
    pub fn inner(&self) -> Option<&dyn std::error::Error> {
        match self {
            Self::Db { source } => Some(source),
            Self::ConnParams { source } => Some(&**source),
            Self::Io { source } => Some(source),
            _ => None,
        }
    }

    pub(crate) fn conn_params(error: Box<dyn std::error::Error + Send + Sync + 'static>) -> Self {
        Self::ConnParams { source: error }
    }

    // The read side of a port died mid-reply; reported with the catalog
    // message so that callers see the same condition the server-side
    // variant would produce.
    pub(crate) fn connection_ran_out() -> Self {
        Self::Db {
            source: ServerError::local(crate::error_code::CONNECTION_RAN_OUT, vec![]),
        }
    }
}

impl<G> From<std::sync::PoisonError<G>> for DqError {
    fn from(_error: std::sync::PoisonError<G>) -> Self {
        Self::Poison
    }
}
