mod cli;
mod commands;
mod config;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use commands::resource::Action;
use nodecfg::engine::Operation;
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
    };
    log::trace!("verbosity {}", ctx.verbose);

    match cli.command {
        Command::Create(args) => commands::resource::write(&ctx, Action::Create, &args.kind, &args.state),
        Command::Read(args) => commands::resource::read(&ctx, &args.kind, &args.state),
        Command::Update(args) => commands::resource::write(&ctx, Action::Update, &args.kind, &args.state),
        Command::Delete(args) => commands::resource::write(&ctx, Action::Delete, &args.kind, &args.state),
        Command::Import { kind, id, state } => commands::resource::import(&ctx, &kind, &id, &state),
        Command::Apply(args) => commands::batch::run(&ctx, Operation::Apply, &args.manifest, args.jobs as usize),
        Command::Refresh(args) => {
            commands::batch::run(&ctx, Operation::Refresh, &args.manifest, args.jobs as usize)
        }
        Command::Destroy(args) => {
            commands::batch::run(&ctx, Operation::Destroy, &args.manifest, args.jobs as usize)
        }
        Command::Kinds => commands::kinds(),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "nodecfg", &mut io::stdout());
            Ok(())
        }
    }
}
