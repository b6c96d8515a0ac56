use std::io;

use bytes::Bytes;
use hangprims_game::{Session, SessionSnapshot, Whence};
use parking_lot::MutexGuard;
use tracing::{debug, info, warn};

use crate::cancel::CancelFlag;
use crate::control::ControlCommand;
use crate::error::Result;
use crate::store::SessionStore;

/// An open session.
///
/// Every method takes the session lock for its full duration and releases
/// it on return, whether the operation succeeded or not. Handles are cheap
/// to clone; clones address the same session.
///
/// `SessionHandle` also implements [`io::Read`], [`io::Write`] and
/// [`io::Seek`], so it can be driven like a file.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    store: SessionStore,
    id: usize,
    cancel: Option<CancelFlag>,
}

impl SessionHandle {
    pub(crate) fn new(store: SessionStore, id: usize) -> Self {
        Self {
            store,
            id,
            cancel: None,
        }
    }

    /// Make lock waits on this handle interruptible by `cancel`.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Read up to `max_len` bytes at the cursor. Empty at end of buffer.
    pub fn read_bytes(&self, max_len: usize) -> Result<Bytes> {
        let mut session = self.lock()?;
        let chunk = session.read(max_len);
        debug!(
            session = self.id,
            len = chunk.len(),
            cursor = session.cursor(),
            "read"
        );
        Ok(chunk)
    }

    /// Apply a write and return how many bytes were consumed.
    pub fn write_bytes(&self, data: &[u8]) -> Result<usize> {
        let mut session = self.lock()?;
        let before = session.phase();

        let report = match session.write_report(data) {
            Ok(report) => report,
            Err(err) => {
                warn!(session = self.id, phase = ?before, error = %err, "write rejected");
                return Err(err.into());
            }
        };

        debug!(
            session = self.id,
            len = data.len(),
            consumed = report.consumed,
            stop = ?report.stop,
            mistakes = session.mistakes(),
            "write applied"
        );
        if session.phase() != before {
            info!(session = self.id, from = ?before, to = ?session.phase(), "phase changed");
        }
        Ok(report.into_result()?)
    }

    /// Run an out-of-band command.
    pub fn control(&self, command: ControlCommand) -> Result<()> {
        let mut session = self.lock()?;
        match command {
            ControlCommand::Reset => {
                session.reset();
                info!(session = self.id, "session reset");
            }
        }
        Ok(())
    }

    /// Decode a raw ioctl-style code and run it. Unknown codes change nothing.
    pub fn control_raw(&self, code: u32) -> Result<()> {
        let command = ControlCommand::from_raw(code).inspect_err(|err| {
            warn!(session = self.id, error = %err, "control rejected");
        })?;
        self.control(command)
    }

    /// Shorthand for `control(ControlCommand::Reset)`.
    pub fn reset(&self) -> Result<()> {
        self.control(ControlCommand::Reset)
    }

    /// Move the cursor within `0..=word_len` and return the new position.
    pub fn seek_to(&self, offset: i64, whence: Whence) -> Result<u64> {
        let mut session = self.lock()?;
        match session.seek(offset, whence) {
            Ok(pos) => {
                debug!(session = self.id, offset, ?whence, pos, "seek");
                Ok(pos)
            }
            Err(err) => {
                debug!(session = self.id, offset, ?whence, error = %err, "seek rejected");
                Err(err.into())
            }
        }
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        Ok(self.lock()?.snapshot())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Session>> {
        self.store.lock(self.id, self.cancel.as_ref())
    }
}

impl io::Read for SessionHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let chunk = self.read_bytes(buf.len())?;
        buf[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }
}

impl io::Write for SessionHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_bytes(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for SessionHandle {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            io::SeekFrom::Start(offset) => {
                let offset = i64::try_from(offset).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "seek offset too large")
                })?;
                (offset, Whence::Start)
            }
            io::SeekFrom::Current(offset) => (offset, Whence::Current),
            io::SeekFrom::End(offset) => (offset, Whence::End),
        };
        Ok(self.seek_to(offset, whence)?)
    }
}
