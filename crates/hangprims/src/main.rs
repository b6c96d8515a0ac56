mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use hangprims_store::{StoreConfig, DEFAULT_SESSION_COUNT};

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "hangprims", version, about = "Multiplexed hangman sessions CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "HANGPRIMS_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    /// Number of sessions in the store.
    #[arg(
        long,
        value_name = "COUNT",
        default_value_t = DEFAULT_SESSION_COUNT,
        env = "HANGPRIMS_SESSIONS",
        global = true
    )]
    sessions: usize,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let config = StoreConfig::default().with_session_count(cli.sessions);
    let result = cmd::run(cli.command, format, config);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_play_subcommand() {
        let cli = Cli::try_parse_from(["hangprims", "play", "apple", "aplez", "z"])
            .expect("play args should parse");

        match cli.command {
            Command::Play(args) => {
                assert_eq!(args.word, "apple");
                assert_eq!(args.guesses, vec!["aplez", "z"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn sessions_flag_is_global() {
        let cli = Cli::try_parse_from(["hangprims", "check", "--sessions", "12"])
            .expect("check args should parse");
        assert_eq!(cli.sessions, 12);
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn play_requires_a_word() {
        let err = Cli::try_parse_from(["hangprims", "play"]).expect_err("missing word should fail");
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn parses_shell_session() {
        let cli = Cli::try_parse_from(["hangprims", "--format", "json", "shell", "--session", "3"])
            .expect("shell args should parse");
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(matches!(cli.command, Command::Shell(ref args) if args.session == 3));
    }
}
