/// Errors surfaced at the guest/host boundary
use crate::handle::RawHandle;

pub type Result<T> = std::result::Result<T, SceneError>;

/// Status returned to the host when an entry point succeeds
pub const STATUS_OK: i32 = 0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The handle was never issued by this guest
    #[error("Unknown handle {handle}")]
    InvalidHandle { handle: RawHandle },

    /// The handle was issued, but its last host reference has been released
    #[error("Handle {handle} was used after being dropped")]
    UseAfterDrop { handle: RawHandle },

    #[error("Host table for {resource} is exhausted")]
    ResourceExhausted { resource: &'static str },

    #[error("Shared buffers have not been registered")]
    BufferNotRegistered,

    #[error("No root object has been installed")]
    NoRoot,
}

impl SceneError {
    /// Stable negative status code reported to the host
    pub fn code(&self) -> i32 {
        match self {
            SceneError::InvalidHandle { .. } => -1,
            SceneError::UseAfterDrop { .. } => -2,
            SceneError::ResourceExhausted { .. } => -3,
            SceneError::BufferNotRegistered => -4,
            SceneError::NoRoot => -5,
        }
    }
}

/// Collapse an entry point result into the status value the host receives
pub fn status(result: Result<()>) -> i32 {
    match result {
        Ok(()) => STATUS_OK,
        Err(err) => err.code(),
    }
}
