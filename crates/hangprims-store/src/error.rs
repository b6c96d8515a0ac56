use hangprims_game::GameError;

/// Errors that can occur in store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The session rejected the operation.
    #[error(transparent)]
    Game(#[from] GameError),

    /// No session with this id.
    #[error("session {id} not found (store has {count} sessions)")]
    NotFound { id: usize, count: usize },

    /// Waiting for the session lock was interrupted.
    #[error("waiting for session {0} was cancelled")]
    Cancelled(usize),

    /// The control code is not a known command.
    #[error("unknown control code {0:#06x}")]
    UnknownControl(u32),

    /// The store configuration is unusable.
    #[error("invalid store config: {0}")]
    InvalidConfig(String),
}

/// Coarse classification shared by every surface (Rust, C, CLI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Cancelled,
    Internal,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Game(err) if err.is_invalid_argument() => ErrorKind::InvalidArgument,
            StoreError::Game(_) => ErrorKind::Internal,
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::Cancelled(_) => ErrorKind::Cancelled,
            StoreError::UnknownControl(_) | StoreError::InvalidConfig(_) => {
                ErrorKind::InvalidArgument
            }
        }
    }
}

impl From<StoreError> for std::io::Error {
    // Cancelled is not mapped to `Interrupted`: std's read/write loops retry
    // on that kind, which would spin on a raised flag.
    fn from(err: StoreError) -> Self {
        let kind = match err.kind() {
            ErrorKind::InvalidArgument => std::io::ErrorKind::InvalidInput,
            ErrorKind::NotFound => std::io::ErrorKind::NotFound,
            ErrorKind::Cancelled => std::io::ErrorKind::Other,
            ErrorKind::Internal => std::io::ErrorKind::OutOfMemory,
        };
        std::io::Error::new(kind, err)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            StoreError::from(GameError::GameFinished).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            StoreError::from(GameError::OutOfMemory { requested: 1 }).kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            StoreError::NotFound { id: 9, count: 8 }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(StoreError::Cancelled(0).kind(), ErrorKind::Cancelled);
        assert_eq!(
            StoreError::UnknownControl(0x0702).kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn io_conversion_keeps_message() {
        let io: std::io::Error = StoreError::from(GameError::EmptyWord).into();
        assert_eq!(io.kind(), std::io::ErrorKind::InvalidInput);
        assert_eq!(io.to_string(), "secret word must not be empty");
    }
}
