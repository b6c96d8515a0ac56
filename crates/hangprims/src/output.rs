use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use hangprims_store::SessionSnapshot;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// One write call and what came of it.
#[derive(Debug, Clone, Serialize)]
pub struct WriteRecord {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct GameOutput<'a> {
    session: usize,
    writes: &'a [WriteRecord],
    state: &'a SessionSnapshot,
    board: String,
}

pub fn print_game(
    session: usize,
    writes: &[WriteRecord],
    state: &SessionSnapshot,
    board: &[u8],
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = GameOutput {
                session,
                writes,
                state,
                board: text_preview(board),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "INPUT", "CONSUMED", "ERROR"]);
            for (index, record) in writes.iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    record.input.clone(),
                    record
                        .consumed
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    record.error.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
            println!("{}", state_line(state));
            print_raw(board);
        }
        OutputFormat::Pretty => {
            for record in writes {
                match (&record.consumed, &record.error) {
                    (Some(consumed), _) => println!("write {:?} -> {consumed}", record.input),
                    (None, Some(error)) => println!("write {:?} -> error: {error}", record.input),
                    (None, None) => println!("write {:?}", record.input),
                }
            }
            println!("{}", state_line(state));
            print_raw(board);
        }
        OutputFormat::Raw => print_raw(board),
    }
}

/// One-line summary of a session.
pub fn state_line(state: &SessionSnapshot) -> String {
    let mut line = format!(
        "phase={:?} mistakes={} cursor={}",
        state.phase, state.mistakes, state.cursor
    )
    .to_lowercase();
    if let Some(outcome) = state.outcome {
        line.push_str(&format!(" outcome={}", format!("{outcome:?}").to_lowercase()));
    }
    if !state.mask.is_empty() {
        line.push_str(&format!(" mask={}", state.mask));
    }
    line
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn text_preview(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", data.len()),
    }
}

#[cfg(test)]
mod tests {
    use hangprims_store::Phase;

    use super::*;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            phase: Phase::Guessing,
            outcome: None,
            mask: "*pp**".to_string(),
            word_len: 5,
            mistakes: 1,
            cursor: 0,
        }
    }

    #[test]
    fn state_line_is_compact() {
        assert_eq!(
            state_line(&snapshot()),
            "phase=guessing mistakes=1 cursor=0 mask=*pp**"
        );
    }

    #[test]
    fn game_output_serializes_writes() {
        let writes = vec![
            WriteRecord {
                input: "apple".to_string(),
                consumed: Some(5),
                error: None,
            },
            WriteRecord {
                input: "1".to_string(),
                consumed: None,
                error: Some("bad".to_string()),
            },
        ];
        let state = snapshot();
        let out = GameOutput {
            session: 0,
            writes: &writes,
            state: &state,
            board: text_preview(b"*pp**\n"),
        };
        let json = serde_json::to_string(&out).expect("game output should serialize");
        assert!(json.contains("\"consumed\":5"));
        assert!(json.contains("\"error\":\"bad\""));
        assert!(json.contains("\"phase\":\"guessing\""));
        assert!(!json.contains("outcome"));
    }
}
