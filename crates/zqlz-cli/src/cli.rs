//! `zqlz` - review AI-suggested SQL edits hunk by hunk from the terminal.

mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use zqlz_ai_diff::PatchDirection;

use crate::commands::ReviewFiles;

#[derive(Debug, Parser)]
#[command(name = "zqlz", version, about = "Review AI-suggested SQL edits hunk by hunk")]
struct Cli {
    /// More detailed logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log filter directives, e.g. "zqlz_ai_diff=trace"
    #[arg(long, global = true, env = "ZQLZ_LOG")]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the hunks between the base and proposed files
    Hunks {
        #[command(flatten)]
        files: FileArgs,

        /// Print hunks as JSON
        #[arg(long)]
        json: bool,
    },
    /// Take a proposed hunk into the base text
    Accept(ActionArgs),
    /// Drop a proposed hunk from the proposed text
    Reject(ActionArgs),
}

#[derive(Debug, Args)]
struct FileArgs {
    /// Current text
    base: PathBuf,
    /// Suggested replacement text
    proposed: PathBuf,
}

impl FileArgs {
    fn review_files(&self) -> ReviewFiles {
        ReviewFiles::new(&self.base, &self.proposed)
    }
}

#[derive(Debug, Args)]
struct ActionArgs {
    #[command(flatten)]
    files: FileArgs,

    /// Index of the hunk as listed by `zqlz hunks`; all hunks when omitted
    #[arg(long)]
    hunk: Option<usize>,

    /// Rewrite the file in place instead of printing the result
    #[arg(long)]
    write: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = if cli.verbose {
        logging::LoggingConfig::verbose()
    } else {
        logging::LoggingConfig::default()
    };
    if let Some(filter) = &cli.log_filter {
        config = config.with_filter(filter.clone());
    }
    logging::init(config)?;

    let output = match &cli.command {
        Command::Hunks { files, json } => {
            let dual = files.review_files().read()?;
            commands::render_hunks(&commands::list_hunks(&dual), *json)?
        }
        Command::Accept(args) => run(args, PatchDirection::Accept)?,
        Command::Reject(args) => run(args, PatchDirection::Reject)?,
    };

    print!("{output}");
    Ok(())
}

fn run(args: &ActionArgs, direction: PatchDirection) -> Result<String> {
    commands::run_action(&args.files.review_files(), args.hunk, direction, args.write)
}
