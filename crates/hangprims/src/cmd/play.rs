use std::io::Read;

use hangprims_store::{SessionHandle, SessionStore, StoreConfig};
use tracing::info;

use crate::cmd::PlayArgs;
use crate::exit::{io_error, store_error, CliResult, SUCCESS};
use crate::output::{print_game, OutputFormat, WriteRecord};

pub fn run(args: PlayArgs, format: OutputFormat, config: StoreConfig) -> CliResult<i32> {
    let store = SessionStore::new(config).map_err(|err| store_error("store setup failed", err))?;
    let mut handle = store
        .open(args.session)
        .map_err(|err| store_error("open failed", err))?;

    let mut writes = Vec::with_capacity(args.guesses.len() + 1);
    let consumed = handle
        .write_bytes(args.word.as_bytes())
        .map_err(|err| store_error("word rejected", err))?;
    writes.push(WriteRecord {
        input: args.word.clone(),
        consumed: Some(consumed),
        error: None,
    });

    for guess in &args.guesses {
        writes.push(apply(&handle, guess));
    }

    let state = handle
        .snapshot()
        .map_err(|err| store_error("state failed", err))?;
    let mut board = Vec::new();
    handle
        .read_to_end(&mut board)
        .map_err(|err| io_error("read failed", err))?;

    info!(
        session = args.session,
        writes = writes.len(),
        phase = ?state.phase,
        "game played"
    );
    print_game(args.session, &writes, &state, &board, format);
    Ok(SUCCESS)
}

fn apply(handle: &SessionHandle, guess: &str) -> WriteRecord {
    match handle.write_bytes(guess.as_bytes()) {
        Ok(consumed) => WriteRecord {
            input: guess.to_string(),
            consumed: Some(consumed),
            error: None,
        },
        Err(err) => WriteRecord {
            input: guess.to_string(),
            consumed: None,
            error: Some(err.to_string()),
        },
    }
}
