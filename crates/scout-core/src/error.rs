use thiserror::Error;
use tracing::error;

/// Every failure a core operation can report. Messages are safe to show
/// to the caller; store details are only logged.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("You must be signed in")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Something went wrong, please try again")]
    StoreFailure,
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Recover a domain error raised inside a store closure, or classify
    /// anything else as a store failure.
    pub(crate) fn from_store(err: anyhow::Error) -> Self {
        match err.downcast::<CoreError>() {
            Ok(core) => core,
            Err(err) => {
                error!("Store failure: {:#}", err);
                Self::StoreFailure
            }
        }
    }
}
