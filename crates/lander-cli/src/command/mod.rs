use std::io;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

use self::{play::PlayArg, replay::ReplayArg, solve::SolveArg};

mod play;
mod replay;
mod solve;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Control the lander turn by turn over stdin/stdout
    Play(#[clap(flatten)] PlayArg),
    /// Search a complete landing plan offline and write it as JSON
    Solve(#[clap(flatten)] SolveArg),
    /// Re-simulate a saved landing plan
    Replay(#[clap(flatten)] ReplayArg),
}

pub fn run() -> anyhow::Result<()> {
    init_tracing();
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Solve(arg) => solve::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
    }
    Ok(())
}

/// Logs go to stderr; stdout carries protocol output and JSON documents.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
