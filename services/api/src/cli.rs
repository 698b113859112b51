use crate::commands::{run_list, run_move, run_purge, ListArgs, MoveArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use job_triage::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "job-triage",
    about = "Fetch job postings and triage them into saved, applied and archived lists",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service and the scheduled refresh (default command)
    Serve(ServeArgs),
    /// Fetch the latest postings and print one category
    List(ListArgs),
    /// Toggle a posting into or out of a category
    Move(MoveArgs),
    /// Drop stored identifiers that no longer match a live posting
    Purge,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::List(args) => run_list(args).await,
        Command::Move(args) => run_move(args).await,
        Command::Purge => run_purge().await,
    }
}
