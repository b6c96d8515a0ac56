use std::fmt::Debug;
use std::io::Read;
use std::thread;

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use hangprims_game::{GALLOWS_SIZE, GALLOWS_TEMPLATE, LIMBS, PROMPT};
use hangprims_store::{
    ErrorKind, Outcome, Phase, SessionHandle, SessionStore, StoreConfig, StoreError, Whence,
    IOCTL_RESET,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cmd::CheckArgs;
use crate::exit::{store_error, CliError, CliResult, CHECK_FAILED, SUCCESS, USAGE};
use crate::output::{print_json, OutputFormat};

/// Sessions the suite addresses (ids 0 through 5).
pub const REQUIRED_SESSIONS: usize = 6;

const WORD: &[u8] = b"apple";

type CaseResult = Result<(), String>;

struct Case {
    name: &'static str,
    run: fn(&SessionStore) -> CaseResult,
}

macro_rules! cases {
    ($($name:ident),* $(,)?) => {
        &[$(Case { name: stringify!($name), run: $name }),*]
    };
}

const CASES: &[Case] = cases![
    invalid_control_code,
    reset_in_choosing,
    reset_in_guessing,
    reset_in_finished,
    bad_call_then_reset,
    read_in_choosing,
    read_in_guessing,
    correct_guess_keeps_figure,
    repeated_letter_revealed_at_once,
    wrong_guess_draws_figure,
    six_misses_lose,
    non_letter_guess_rejected,
    non_letter_sequence_rejected,
    invalid_word_rejected,
    finish_without_mistakes,
    extra_bytes_after_win_ignored,
    zero_write_in_choosing_fails,
    zero_write_in_guessing_succeeds,
    zero_write_in_finished_fails,
    write_in_finished_fails,
    word_write_returns_length,
    seek_stays_in_mask,
    games_with_different_words,
    twenty_games_in_a_row,
    hundred_threads_one_session,
    one_thread_two_sessions,
    two_threads_one_session,
    good_and_bad_threads,
    racing_threads,
    ninety_nine_bad_one_good,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum CaseStatus {
    Pass,
    Fail,
}

#[derive(Debug, Serialize)]
struct CaseReport {
    index: usize,
    name: &'static str,
    status: CaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckOutput {
    sessions: usize,
    passed: usize,
    failed: usize,
    cases: Vec<CaseReport>,
    overall: &'static str,
}

pub fn run(args: CheckArgs, format: OutputFormat, config: StoreConfig) -> CliResult<i32> {
    if config.session_count < REQUIRED_SESSIONS {
        return Err(CliError::new(
            USAGE,
            format!(
                "check needs at least {REQUIRED_SESSIONS} sessions (got {})",
                config.session_count
            ),
        ));
    }
    let store = SessionStore::new(config).map_err(|err| store_error("store setup failed", err))?;

    let output = run_cases(&store, args.filter.as_deref());
    print_check(&output, format);

    if output.failed > 0 {
        Ok(CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn run_cases(store: &SessionStore, filter: Option<&str>) -> CheckOutput {
    let cases: Vec<CaseReport> = CASES
        .iter()
        .filter(|case| filter.is_none_or(|text| case.name.contains(text)))
        .enumerate()
        .map(|(index, case)| {
            let result = (case.run)(store);
            match &result {
                Ok(()) => debug!(case = case.name, "case passed"),
                Err(detail) => warn!(case = case.name, %detail, "case failed"),
            }
            CaseReport {
                index: index + 1,
                name: case.name,
                status: if result.is_ok() {
                    CaseStatus::Pass
                } else {
                    CaseStatus::Fail
                },
                detail: result.err(),
            }
        })
        .collect();

    let failed = cases
        .iter()
        .filter(|case| case.status == CaseStatus::Fail)
        .count();
    CheckOutput {
        sessions: store.len(),
        passed: cases.len() - failed,
        failed,
        cases,
        overall: if failed > 0 { "fail" } else { "pass" },
    }
}

fn print_check(output: &CheckOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "CASE", "STATUS", "DETAIL"]);
            for case in &output.cases {
                table.add_row(vec![
                    case.index.to_string(),
                    case.name.to_string(),
                    status_text(case.status).to_string(),
                    case.detail.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
            println!("{} passed, {} failed", output.passed, output.failed);
        }
        OutputFormat::Pretty | OutputFormat::Raw => print!("{}", tap(output)),
    }
}

fn tap(output: &CheckOutput) -> String {
    let mut out = format!("1..{}\n", output.cases.len());
    for case in &output.cases {
        match (&case.status, &case.detail) {
            (CaseStatus::Pass, _) => out.push_str(&format!("ok {} - {}\n", case.index, case.name)),
            (CaseStatus::Fail, detail) => out.push_str(&format!(
                "not ok {} - {} # {}\n",
                case.index,
                case.name,
                detail.as_deref().unwrap_or("failed")
            )),
        }
    }
    out
}

fn status_text(status: CaseStatus) -> &'static str {
    match status {
        CaseStatus::Pass => "PASS",
        CaseStatus::Fail => "FAIL",
    }
}

// Helpers shared by the cases.

fn fresh(store: &SessionStore, id: usize) -> Result<SessionHandle, String> {
    let handle = store.open(id).map_err(|err| format!("open {id}: {err}"))?;
    handle.reset().map_err(|err| format!("reset {id}: {err}"))?;
    Ok(handle)
}

fn guessing(store: &SessionStore, id: usize, word: &[u8]) -> Result<SessionHandle, String> {
    let handle = fresh(store, id)?;
    write_expect(&handle, word, word.len())?;
    Ok(handle)
}

fn write_expect(handle: &SessionHandle, data: &[u8], want: usize) -> CaseResult {
    let got = handle
        .write_bytes(data)
        .map_err(|err| format!("write {:?}: {err}", text(data)))?;
    expect_eq(&format!("consumed by {:?}", text(data)), got, want)
}

fn write_rejected(handle: &SessionHandle, data: &[u8]) -> CaseResult {
    match handle.write_bytes(data) {
        Err(err) if err.kind() == ErrorKind::InvalidArgument => Ok(()),
        Err(err) => Err(format!("write {:?}: wrong error: {err}", text(data))),
        Ok(n) => Err(format!("write {:?}: expected rejection, got {n}", text(data))),
    }
}

fn read_all(handle: &SessionHandle) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    handle
        .clone()
        .read_to_end(&mut buf)
        .map_err(|err| format!("read: {err}"))?;
    Ok(buf)
}

fn expect_eq<T: PartialEq + Debug>(what: &str, got: T, want: T) -> CaseResult {
    if got == want {
        Ok(())
    } else {
        Err(format!("{what}: got {got:?}, want {want:?}"))
    }
}

fn expect_board(handle: &SessionHandle, mask: &[u8], limbs: usize) -> CaseResult {
    let got = read_all(handle)?;
    expect_eq("board", text(&got), text(&board(mask, limbs)))
}

fn expect_prompt(handle: &SessionHandle) -> CaseResult {
    let got = read_all(handle)?;
    expect_eq("prompt", text(&got), text(PROMPT))
}

fn board(mask: &[u8], limbs: usize) -> Vec<u8> {
    let mut gallows = *GALLOWS_TEMPLATE;
    for &(offset, glyph) in LIMBS.iter().take(limbs) {
        gallows[offset] = glyph;
    }
    let mut out = Vec::with_capacity(mask.len() + 1 + GALLOWS_SIZE);
    out.extend_from_slice(mask);
    out.push(b'\n');
    out.extend_from_slice(&gallows);
    out
}

fn text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

fn phase(handle: &SessionHandle) -> Result<Phase, String> {
    Ok(handle.snapshot().map_err(|err| format!("state: {err}"))?.phase)
}

/// Play `word` to a win from the choosing phase, then reset.
fn full_game(handle: &SessionHandle, word: &[u8], consumed: usize) -> CaseResult {
    handle.reset().map_err(|err| format!("reset: {err}"))?;
    write_expect(handle, word, word.len())?;
    write_expect(handle, word, consumed)?;
    let state = handle.snapshot().map_err(|err| format!("state: {err}"))?;
    expect_eq("outcome", state.outcome, Some(Outcome::Won))?;
    expect_board(handle, word, 0)?;
    handle.reset().map_err(|err| format!("reset: {err}"))
}

fn join_all<T>(workers: Vec<thread::JoinHandle<T>>) -> Result<Vec<T>, String> {
    workers
        .into_iter()
        .map(|worker| worker.join().map_err(|_| "worker panicked".to_string()))
        .collect()
}

// Cases.

fn invalid_control_code(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    match handle.control_raw(0x0702) {
        Err(StoreError::UnknownControl(_)) => {}
        other => return Err(format!("control 0x0702: {other:?}")),
    }
    expect_eq("phase", phase(&handle)?, Phase::Guessing)
}

fn reset_in_choosing(store: &SessionStore) -> CaseResult {
    let handle = fresh(store, 0)?;
    handle
        .control_raw(IOCTL_RESET)
        .map_err(|err| format!("reset: {err}"))?;
    expect_prompt(&handle)
}

fn reset_in_guessing(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    write_expect(&handle, b"z", 1)?;
    handle
        .control_raw(IOCTL_RESET)
        .map_err(|err| format!("reset: {err}"))?;
    expect_prompt(&handle)
}

fn reset_in_finished(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    write_expect(&handle, WORD, WORD.len())?;
    expect_eq("phase", phase(&handle)?, Phase::Finished)?;
    handle
        .control_raw(IOCTL_RESET)
        .map_err(|err| format!("reset: {err}"))?;
    expect_prompt(&handle)
}

fn bad_call_then_reset(store: &SessionStore) -> CaseResult {
    let handle = fresh(store, 0)?;
    write_rejected(&handle, b"ab1")?;
    handle.reset().map_err(|err| format!("reset: {err}"))?;
    expect_prompt(&handle)?;
    write_expect(&handle, WORD, WORD.len())
}

fn read_in_choosing(store: &SessionStore) -> CaseResult {
    let handle = fresh(store, 0)?;
    expect_prompt(&handle)?;
    // The cursor is now at the end.
    let tail = handle
        .read_bytes(PROMPT.len())
        .map_err(|err| format!("read: {err}"))?;
    expect_eq("read at end", tail.len(), 0)
}

fn read_in_guessing(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    let got = read_all(&handle)?;
    expect_eq("board length", got.len(), WORD.len() + 1 + GALLOWS_SIZE)?;
    expect_eq("board", text(&got), text(&board(b"*****", 0)))
}

fn correct_guess_keeps_figure(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    write_expect(&handle, b"a", 1)?;
    expect_board(&handle, b"a****", 0)
}

fn repeated_letter_revealed_at_once(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    write_expect(&handle, b"p", 1)?;
    expect_board(&handle, b"*pp**", 0)?;
    write_expect(&handle, b"p", 1)?;
    expect_board(&handle, b"*pp**", 0)
}

fn wrong_guess_draws_figure(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    write_expect(&handle, b"z", 1)?;
    expect_board(&handle, b"*****", 1)?;
    write_expect(&handle, b"zzzz", 4)?;
    expect_board(&handle, b"*****", 1)?;
    write_expect(&handle, b"q", 1)?;
    expect_board(&handle, b"*****", 2)
}

fn six_misses_lose(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    write_expect(&handle, b"bcdfghij", 6)?;
    let state = handle.snapshot().map_err(|err| format!("state: {err}"))?;
    expect_eq("outcome", state.outcome, Some(Outcome::Lost))?;
    expect_eq("mistakes", state.mistakes, 6)?;
    expect_board(&handle, b"*****", 6)
}

fn non_letter_guess_rejected(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    for guess in [&b"1"[..], b"A", b" ", b"\0"] {
        write_rejected(&handle, guess)?;
    }
    expect_board(&handle, b"*****", 0)
}

fn non_letter_sequence_rejected(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    write_rejected(&handle, b"12$A")?;
    expect_board(&handle, b"*****", 0)?;
    // A bad byte after good ones stops the write without failing it.
    write_expect(&handle, b"az1e", 2)?;
    expect_board(&handle, b"a****", 1)
}

fn invalid_word_rejected(store: &SessionStore) -> CaseResult {
    let handle = fresh(store, 0)?;
    for word in [&b"Apple"[..], b"app le", b"abc1abc1abc", b"apple\n"] {
        write_rejected(&handle, word)?;
        expect_eq("phase", phase(&handle)?, Phase::Choosing)?;
    }
    expect_prompt(&handle)
}

fn finish_without_mistakes(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    write_expect(&handle, WORD, WORD.len())?;
    expect_eq("phase", phase(&handle)?, Phase::Finished)?;
    expect_board(&handle, WORD, 0)
}

fn extra_bytes_after_win_ignored(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    write_expect(&handle, b"aplez", 4)?;
    expect_board(&handle, WORD, 0)
}

fn zero_write_in_choosing_fails(store: &SessionStore) -> CaseResult {
    let handle = fresh(store, 0)?;
    write_rejected(&handle, b"")?;
    expect_eq("phase", phase(&handle)?, Phase::Choosing)
}

fn zero_write_in_guessing_succeeds(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    write_expect(&handle, b"z", 1)?;
    let before = read_all(&handle)?;
    write_expect(&handle, b"", 0)?;
    let after = read_all(&handle)?;
    expect_eq("board after empty write", text(&after), text(&before))
}

fn zero_write_in_finished_fails(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    write_expect(&handle, WORD, WORD.len())?;
    write_rejected(&handle, b"")
}

fn write_in_finished_fails(store: &SessionStore) -> CaseResult {
    let handle = guessing(store, 0, WORD)?;
    write_expect(&handle, b"bcdfgh", 6)?;
    write_rejected(&handle, b"a")?;
    expect_board(&handle, b"*****", 6)
}

fn word_write_returns_length(store: &SessionStore) -> CaseResult {
    for word in [&b"a"[..], b"kdlp", b"linuxkernel"] {
        let handle = guessing(store, 0, word)?;
        let state = handle.snapshot().map_err(|err| format!("state: {err}"))?;
        expect_eq("word_len", state.word_len, word.len())?;
    }
    Ok(())
}

fn seek_stays_in_mask(store: &SessionStore) -> CaseResult {
    let handle = fresh(store, 0)?;
    if handle.seek_to(1, Whence::Start).is_ok() {
        return Err("seek past an empty word succeeded".to_string());
    }
    write_expect(&handle, WORD, WORD.len())?;
    let pos = handle
        .seek_to(-1, Whence::End)
        .map_err(|err| format!("seek: {err}"))?;
    expect_eq("pos", pos, 4)?;
    let chunk = handle.read_bytes(2).map_err(|err| format!("read: {err}"))?;
    expect_eq("tail", text(&chunk), "*\n".to_string())?;
    if handle.seek_to(-7, Whence::Current).is_ok() {
        return Err("seek before start succeeded".to_string());
    }
    let state = handle.snapshot().map_err(|err| format!("state: {err}"))?;
    expect_eq("cursor after rejected seek", state.cursor, 6)
}

fn games_with_different_words(store: &SessionStore) -> CaseResult {
    let table: [(&[u8], &[u8], usize); 6] = [
        (b"apple", b"aplez", 4),
        (b"apple", b"zzzzzzzz", 8),
        (b"anakin", b"anakin", 5),
        (b"palpatin", b"palpatin", 8),
        (b"kdlp", b"kdlp", 4),
        (b"linuxkernel", b"linuxkernel", 8),
    ];
    for (word, guess, want) in table {
        let handle = guessing(store, 0, word)?;
        write_expect(&handle, guess, want)?;
    }
    Ok(())
}

fn twenty_games_in_a_row(store: &SessionStore) -> CaseResult {
    let handle = fresh(store, 0)?;
    for _ in 0..20 {
        full_game(&handle, b"anakin", 5)?;
    }
    Ok(())
}

fn hundred_threads_one_session(store: &SessionStore) -> CaseResult {
    fresh(store, 4)?;
    let workers = (0..100)
        .map(|_| {
            let handle = store.open(4).map_err(|err| format!("open: {err}"))?;
            Ok(thread::spawn(move || handle.write_bytes(b"anakin")))
        })
        .collect::<Result<Vec<_>, String>>()?;
    let results = join_all(workers)?;

    // First write sets the word, second wins, the rest hit a finished game.
    let set = results.iter().filter(|r| matches!(r, Ok(6))).count();
    let won = results.iter().filter(|r| matches!(r, Ok(5))).count();
    let finished = results
        .iter()
        .filter(|r| matches!(r, Err(err) if err.kind() == ErrorKind::InvalidArgument))
        .count();
    expect_eq("word writes", set, 1)?;
    expect_eq("winning writes", won, 1)?;
    expect_eq("rejected writes", finished, 98)
}

fn one_thread_two_sessions(store: &SessionStore) -> CaseResult {
    let first = fresh(store, 1)?;
    let second = fresh(store, 2)?;
    write_expect(&first, b"linuxkernel", 11)?;
    write_expect(&second, b"kernellinux", 11)?;
    write_expect(&first, b"zq", 2)?;

    expect_eq("second mistakes", second.snapshot().map_err(|e| e.to_string())?.mistakes, 0)?;
    write_expect(&first, b"linuxkernel", 8)?;
    write_expect(&second, b"kernellinux", 11)?;
    expect_board(&first, b"linuxkernel", 2)?;
    expect_board(&second, b"kernellinux", 0)
}

fn two_threads_one_session(store: &SessionStore) -> CaseResult {
    guessing(store, 5, b"elementzero")?;
    let workers = [&b"element"[..], b"zero"]
        .into_iter()
        .map(|guess| {
            let handle = store.open(5).map_err(|err| format!("open: {err}"))?;
            Ok(thread::spawn(move || handle.write_bytes(guess)))
        })
        .collect::<Result<Vec<_>, String>>()?;
    for result in join_all(workers)? {
        result.map_err(|err| format!("worker write: {err}"))?;
    }

    let handle = store.open(5).map_err(|err| format!("open: {err}"))?;
    let mask = handle.read_bytes(11).map_err(|err| format!("read: {err}"))?;
    expect_eq("mask", text(&mask), "elementzero".to_string())
}

fn good_and_bad_threads(store: &SessionStore) -> CaseResult {
    guessing(store, 5, b"ssvnormandy")?;
    let workers = [&b"norm"[..], b"black"]
        .into_iter()
        .map(|guess| {
            let handle = store.open(5).map_err(|err| format!("open: {err}"))?;
            Ok(thread::spawn(move || handle.write_bytes(guess)))
        })
        .collect::<Result<Vec<_>, String>>()?;
    for result in join_all(workers)? {
        result.map_err(|err| format!("worker write: {err}"))?;
    }

    let handle = store.open(5).map_err(|err| format!("open: {err}"))?;
    let mask = handle.read_bytes(11).map_err(|err| format!("read: {err}"))?;
    expect_eq("mask", text(&mask), "***norman**".to_string())
}

fn racing_threads(store: &SessionStore) -> CaseResult {
    guessing(store, 3, b"krogan")?;
    let workers = (0..15)
        .map(|_| {
            let handle = store.open(3).map_err(|err| format!("open: {err}"))?;
            Ok(thread::spawn(move || handle.write_bytes(b"krogan")))
        })
        .collect::<Result<Vec<_>, String>>()?;
    let results = join_all(workers)?;

    let wins = results.iter().filter(|r| matches!(r, Ok(6))).count();
    expect_eq("winning writes", wins, 1)?;
    let handle = store.open(3).map_err(|err| format!("open: {err}"))?;
    expect_board(&handle, b"krogan", 0)
}

fn ninety_nine_bad_one_good(store: &SessionStore) -> CaseResult {
    guessing(store, 1, b"protheans")?;

    let good = store.open(1).map_err(|err| format!("open: {err}"))?;
    let mut workers = vec![thread::spawn(move || {
        for letter in b"protheans" {
            let _ = good.write_bytes(std::slice::from_ref(letter));
            thread::yield_now();
        }
    })];
    for _ in 0..99 {
        let bad = store.open(1).map_err(|err| format!("open: {err}"))?;
        workers.push(thread::spawn(move || {
            for letter in b"zuky" {
                let _ = bad.write_bytes(std::slice::from_ref(letter));
            }
        }));
    }
    join_all(workers)?;

    let handle = store.open(1).map_err(|err| format!("open: {err}"))?;
    let mask = handle.read_bytes(9).map_err(|err| format!("read: {err}"))?;
    expect_eq("mask", text(&mask), "protheans".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(StoreConfig::default().with_session_count(REQUIRED_SESSIONS))
            .expect("store should build")
    }

    #[test]
    fn every_case_passes() {
        let output = run_cases(&store(), None);
        let failures: Vec<_> = output
            .cases
            .iter()
            .filter(|case| case.status == CaseStatus::Fail)
            .map(|case| format!("{}: {:?}", case.name, case.detail))
            .collect();
        assert!(failures.is_empty(), "{failures:#?}");
        assert_eq!(output.passed, CASES.len());
        assert_eq!(output.overall, "pass");
    }

    #[test]
    fn case_names_are_unique() {
        let mut names: Vec<_> = CASES.iter().map(|case| case.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CASES.len());
    }

    #[test]
    fn filter_selects_cases() {
        let output = run_cases(&store(), Some("reset_in"));
        assert_eq!(output.cases.len(), 3);
        assert_eq!(output.cases[0].index, 1);
    }

    #[test]
    fn tap_reports_failures_with_detail() {
        let output = CheckOutput {
            sessions: 6,
            passed: 1,
            failed: 1,
            cases: vec![
                CaseReport {
                    index: 1,
                    name: "a",
                    status: CaseStatus::Pass,
                    detail: None,
                },
                CaseReport {
                    index: 2,
                    name: "b",
                    status: CaseStatus::Fail,
                    detail: Some("boom".to_string()),
                },
            ],
            overall: "fail",
        };
        assert_eq!(tap(&output), "1..2\nok 1 - a\nnot ok 2 - b # boom\n");
    }

    #[test]
    fn too_few_sessions_is_usage_error() {
        let err = run(
            CheckArgs::default(),
            OutputFormat::Json,
            StoreConfig::default().with_session_count(2),
        )
        .unwrap_err();
        assert_eq!(err.code, USAGE);
    }
}
