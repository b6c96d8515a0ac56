use clap::{Args, Subcommand};
use hangprims_store::StoreConfig;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod check;
pub mod play;
pub mod shell;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play one game: choose WORD, then apply each guess as one write.
    Play(PlayArgs),
    /// Drive sessions interactively, one command per stdin line.
    Shell(ShellArgs),
    /// Run the conformance suite against an in-process store.
    Check(CheckArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: StoreConfig) -> CliResult<i32> {
    match command {
        Command::Play(args) => play::run(args, format, config),
        Command::Shell(args) => shell::run(args, format, config),
        Command::Check(args) => check::run(args, format, config),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Secret word (lowercase a-z).
    pub word: String,
    /// Guesses; each argument is one write call.
    pub guesses: Vec<String>,
    /// Session to play on.
    #[arg(long, default_value_t = 0)]
    pub session: usize,
}

#[derive(Args, Debug)]
pub struct ShellArgs {
    /// Session the shell starts on.
    #[arg(long, default_value_t = 0)]
    pub session: usize,
}

#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Only run cases whose name contains this text.
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
