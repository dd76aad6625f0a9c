// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use contentsync::{module, FileContentSync, ModuleReturn, SyncRequest, WritePolicy};

use anyhow::Result;
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use std::{io::stderr, path::PathBuf, process::exit};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  contentsync [options] <args_file>\n  contentsync <contentsync-command> [options]",
    subcommand_help_heading = "Commands",
    args_conflicts_with_subcommands = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// JSON file of module arguments written by the automation host.
    #[arg(value_name = "args_file")]
    pub args_file: Option<PathBuf>,

    /// Leave target file alone if it already holds desired content.
    #[arg(long)]
    pub skip_unchanged: bool,
}

impl Cli {
    fn run(self) -> Result<ModuleReturn> {
        match self.command {
            Some(Command::Apply(opts)) => run_apply(opts),
            None => match self.args_file {
                Some(args_file) => Ok(run_module(args_file, self.skip_unchanged)),
                None => Cli::command()
                    .error(
                        ErrorKind::MissingRequiredArgument,
                        "either <args_file> or a command is required",
                    )
                    .exit(),
            },
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Synchronize target file directly from the command line.
    #[command(override_usage = "contentsync apply [options] --path <path> --content <content>")]
    Apply(ApplyOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ApplyOptions {
    /// Path to target file.
    #[arg(short, long, value_name = "path")]
    pub path: PathBuf,

    /// Exact content target file should hold.
    #[arg(short, long, value_name = "content", allow_hyphen_values = true)]
    pub content: String,

    /// Report whether target file would change without touching it.
    #[arg(long)]
    pub check: bool,

    /// Leave target file alone if it already holds desired content.
    #[arg(long)]
    pub skip_unchanged: bool,
}

fn main() {
    // INVARIANT: Standard output is reserved for the module return.
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_writer(stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    // INVARIANT: Failures still print a module return.
    let outcome = run().unwrap_or_else(|error| ModuleReturn::fail(format!("{error:#}")));

    println!("{outcome}");
    if let ModuleReturn::Fail { msg, .. } = &outcome {
        error!("{msg}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<ModuleReturn> {
    Cli::parse().run()
}

fn run_module(args_file: PathBuf, skip_unchanged: bool) -> ModuleReturn {
    module::execute(&syncer(skip_unchanged), args_file)
}

fn run_apply(opts: ApplyOptions) -> Result<ModuleReturn> {
    let request = SyncRequest::new(opts.path, opts.content).check_mode(opts.check);
    let result = syncer(opts.skip_unchanged).sync(request)?;

    Ok(result.into())
}

fn syncer(skip_unchanged: bool) -> FileContentSync {
    if skip_unchanged {
        FileContentSync::new(WritePolicy::SkipUnchanged)
    } else {
        FileContentSync::new(WritePolicy::Always)
    }
}
