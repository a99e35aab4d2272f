//! Command-line wrapper over the pipeline and snapshot store: `atlas run`
//! seals a new snapshot, `atlas snapshot ...` inspects, diffs, and publishes
//! existing ones (spec §6 "EXTERNAL INTERFACES").

mod cli;
pub mod commands;
mod error;
mod sources;

pub use cli::{Cli, Commands, SnapshotCommand};
pub use error::CliError;

use std::process::ExitCode;

pub fn run() -> ExitCode {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Run(args) => commands::run::run(&cli, args),
        Commands::Snapshot(SnapshotCommand::List(args)) => commands::snapshot::list(&cli, args),
        Commands::Snapshot(SnapshotCommand::Show(args)) => commands::snapshot::show(&cli, args),
        Commands::Snapshot(SnapshotCommand::Diff(args)) => commands::snapshot::diff_cmd(&cli, args),
        Commands::Snapshot(SnapshotCommand::Publish(args)) => commands::snapshot::publish(&cli, args),
        Commands::Snapshot(SnapshotCommand::Proof(args)) => commands::snapshot::proof(&cli, args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "command failed");
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "atlas=info,warn",
        1 => "atlas=debug,info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}
