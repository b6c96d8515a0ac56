use crate::error::{Result, StoreError};

/// ioctl "type" byte shared by hangman control codes.
pub const HANGMAN_IOC_MAGIC: u32 = 0x07;

/// Encode an argument-less ioctl number, like the C `_IO(type, nr)` macro.
const fn io(ty: u32, nr: u32) -> u32 {
    (ty << 8) | nr
}

/// Raw code of the reset command, `_IO(0x07, 1)`.
pub const IOCTL_RESET: u32 = io(HANGMAN_IOC_MAGIC, 1);

/// Out-of-band commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCommand {
    /// Return the session to the choosing phase.
    Reset,
}

impl ControlCommand {
    pub fn from_raw(code: u32) -> Result<Self> {
        match code {
            IOCTL_RESET => Ok(Self::Reset),
            other => Err(StoreError::UnknownControl(other)),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Self::Reset => IOCTL_RESET,
        }
    }
}
