use std::fmt;
use std::io;

use hangprims_store::{ErrorKind, StoreError};

// sysexits(3) values where one fits; CANCELLED is 128 + SIGINT.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const CHECK_FAILED: i32 = 30;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const NOT_FOUND: i32 = 66;
pub const INTERNAL: i32 = 125;
pub const CANCELLED: i32 = 130;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::BrokenPipe | io::ErrorKind::UnexpectedEof => FAILURE,
        io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn store_error(context: &str, err: StoreError) -> CliError {
    let code = match (&err, err.kind()) {
        (StoreError::InvalidConfig(_), _) => USAGE,
        (_, ErrorKind::InvalidArgument) => DATA_INVALID,
        (_, ErrorKind::NotFound) => NOT_FOUND,
        (_, ErrorKind::Cancelled) => CANCELLED,
        (_, ErrorKind::Internal) => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use hangprims_game::GameError;

    use super::*;

    #[test]
    fn store_errors_pick_exit_codes() {
        let cases = [
            (StoreError::InvalidConfig("x".into()), USAGE),
            (StoreError::Game(GameError::EmptyWord), DATA_INVALID),
            (StoreError::NotFound { id: 9, count: 8 }, NOT_FOUND),
            (StoreError::Cancelled(0), CANCELLED),
            (
                StoreError::Game(GameError::OutOfMemory { requested: 4 }),
                INTERNAL,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(store_error("op", err).code, code);
        }
    }

    #[test]
    fn message_keeps_context() {
        let err = store_error("write failed", StoreError::Game(GameError::GameFinished));
        assert!(err.to_string().starts_with("write failed: "));
    }
}
