use std::io::{self, BufRead};

use hangprims_store::{
    CancelFlag, ErrorKind, SessionHandle, SessionSnapshot, SessionStore, StoreConfig, StoreError,
    Whence,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::cmd::ShellArgs;
use crate::exit::{io_error, store_error, CliError, CliResult, CANCELLED, FAILURE, INTERNAL, SUCCESS};
use crate::output::{print_json, print_raw, state_line, text_preview, OutputFormat};

const DEFAULT_READ_LEN: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Open(usize),
    Write(Vec<u8>),
    Read(usize),
    Seek(i64, Whence),
    Reset,
    Control(u32),
    State,
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Blank,
    Quit,
    Command(ShellCommand),
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Reply {
    Open {
        session: usize,
    },
    Write {
        consumed: usize,
    },
    Read {
        len: usize,
        data: String,
        #[serde(skip)]
        raw: Vec<u8>,
    },
    Seek {
        pos: u64,
    },
    Reset,
    Control {
        code: u32,
    },
    State(SessionSnapshot),
    Error {
        kind: &'static str,
        message: String,
    },
}

struct Shell {
    store: SessionStore,
    handle: SessionHandle,
    cancel: CancelFlag,
    failures: usize,
}

pub fn run(args: ShellArgs, format: OutputFormat, config: StoreConfig) -> CliResult<i32> {
    let store = SessionStore::new(config).map_err(|err| store_error("store setup failed", err))?;
    let cancel = CancelFlag::new();
    install_ctrlc_handler(cancel.clone())?;

    let mut shell = Shell::new(store, args.session, cancel.clone())?;
    info!(session = args.session, "shell started");

    for line in io::stdin().lock().lines() {
        if cancel.is_cancelled() {
            info!("shell interrupted");
            return Ok(CANCELLED);
        }
        let line = line.map_err(|err| io_error("stdin read failed", err))?;

        let reply = match parse_line(&line) {
            Ok(Line::Blank) => continue,
            Ok(Line::Quit) => break,
            Ok(Line::Command(command)) => shell.execute(command),
            Err(message) => {
                shell.failures += 1;
                Reply::Error {
                    kind: "usage",
                    message,
                }
            }
        };
        print_reply(&reply, format);
    }

    if cancel.is_cancelled() {
        return Ok(CANCELLED);
    }
    Ok(if shell.failures > 0 { FAILURE } else { SUCCESS })
}

impl Shell {
    fn new(store: SessionStore, session: usize, cancel: CancelFlag) -> CliResult<Self> {
        let handle = store
            .open(session)
            .map_err(|err| store_error("open failed", err))?
            .with_cancel(cancel.clone());
        Ok(Self {
            store,
            handle,
            cancel,
            failures: 0,
        })
    }

    fn execute(&mut self, command: ShellCommand) -> Reply {
        debug!(session = self.handle.id(), ?command, "shell command");
        match self.try_execute(command) {
            Ok(reply) => reply,
            Err(err) => {
                self.failures += 1;
                Reply::Error {
                    kind: kind_name(err.kind()),
                    message: err.to_string(),
                }
            }
        }
    }

    fn try_execute(&mut self, command: ShellCommand) -> Result<Reply, StoreError> {
        let reply = match command {
            ShellCommand::Open(id) => {
                self.handle = self.store.open(id)?.with_cancel(self.cancel.clone());
                Reply::Open { session: id }
            }
            ShellCommand::Write(data) => Reply::Write {
                consumed: self.handle.write_bytes(&data)?,
            },
            ShellCommand::Read(max_len) => {
                let chunk = self.handle.read_bytes(max_len)?;
                Reply::Read {
                    len: chunk.len(),
                    data: text_preview(&chunk),
                    raw: chunk.to_vec(),
                }
            }
            ShellCommand::Seek(offset, whence) => Reply::Seek {
                pos: self.handle.seek_to(offset, whence)?,
            },
            ShellCommand::Reset => {
                self.handle.reset()?;
                Reply::Reset
            }
            ShellCommand::Control(code) => {
                self.handle.control_raw(code)?;
                Reply::Control { code }
            }
            ShellCommand::State => Reply::State(self.handle.snapshot()?),
        };
        Ok(reply)
    }
}

fn parse_line(line: &str) -> Result<Line, String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Line::Blank);
    }

    let (verb, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    let command = match verb {
        "open" => ShellCommand::Open(parse_number(rest.trim(), "session id")?),
        // Everything after the first space is written verbatim.
        "write" => ShellCommand::Write(rest.as_bytes().to_vec()),
        "read" => match rest.trim() {
            "" => ShellCommand::Read(DEFAULT_READ_LEN),
            len => ShellCommand::Read(parse_number(len, "read length")?),
        },
        "seek" => parse_seek(rest)?,
        "reset" => ShellCommand::Reset,
        "control" => ShellCommand::Control(parse_code(rest.trim())?),
        "state" => ShellCommand::State,
        "quit" | "exit" => return Ok(Line::Quit),
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Line::Command(command))
}

fn parse_seek(rest: &str) -> Result<ShellCommand, String> {
    const USAGE_TEXT: &str = "usage: seek <offset> <set|cur|end>";

    let mut parts = rest.split_whitespace();
    let (Some(offset), Some(whence), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(USAGE_TEXT.to_string());
    };
    let offset = offset
        .parse::<i64>()
        .map_err(|_| format!("invalid seek offset: {offset}"))?;
    let whence = match whence {
        "set" => Whence::Start,
        "cur" => Whence::Current,
        "end" => Whence::End,
        other => return Err(format!("invalid whence: {other} ({USAGE_TEXT})")),
    };
    Ok(ShellCommand::Seek(offset, whence))
}

fn parse_number(text: &str, what: &str) -> Result<usize, String> {
    text.parse::<usize>()
        .map_err(|_| format!("invalid {what}: {text:?}"))
}

fn parse_code(text: &str) -> Result<u32, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse::<u32>(),
    };
    parsed.map_err(|_| format!("invalid control code: {text:?}"))
}

fn kind_name(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidArgument => "invalid_argument",
        ErrorKind::NotFound => "not_found",
        ErrorKind::Cancelled => "cancelled",
        ErrorKind::Internal => "internal",
    }
}

fn print_reply(reply: &Reply, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(reply),
        OutputFormat::Raw => match reply {
            Reply::Read { raw, .. } => print_raw(raw),
            Reply::Write { consumed } => println!("{consumed}"),
            Reply::Seek { pos } => println!("{pos}"),
            Reply::State(state) => println!("{}", state_line(state)),
            Reply::Error { message, .. } => println!("error: {message}"),
            Reply::Open { .. } | Reply::Reset | Reply::Control { .. } => {}
        },
        OutputFormat::Table | OutputFormat::Pretty => match reply {
            Reply::Open { session } => println!("ok: session {session}"),
            Reply::Write { consumed } => println!("ok: wrote {consumed}"),
            Reply::Read { raw, .. } => {
                print_raw(raw);
                if !raw.ends_with(b"\n") {
                    println!();
                }
            }
            Reply::Seek { pos } => println!("ok: pos {pos}"),
            Reply::Reset => println!("ok: reset"),
            Reply::Control { code } => println!("ok: control {code:#06x}"),
            Reply::State(state) => println!("{}", state_line(state)),
            Reply::Error { kind, message } => println!("error ({kind}): {message}"),
        },
    }
}

fn install_ctrlc_handler(cancel: CancelFlag) -> CliResult<()> {
    ctrlc::set_handler(move || {
        cancel.cancel();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
