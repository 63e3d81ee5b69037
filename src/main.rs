mod commands;
mod config;
mod diagnostics;
mod error;
mod locate;
mod opener;
mod resolver;
mod scanner;
mod tiebreak;
mod tree;
mod types;
mod workspace;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::Context;
use crate::error::Error;
use crate::types::{OpenRequest, Positioning};

#[derive(Parser)]
#[command(name = "wsopen", about = "Open the workspace file a repository path or URL refers to")]
struct Cli {
    /// Workspace root directory
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
    /// Config file to use instead of `.wsopen.toml` in the root
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// What to do
    #[command(subcommand)]
    command: Commands,
}

/// Where to put the cursor once the file is open.
#[derive(Args)]
struct PositionArgs {
    /// Select the first case-insensitive occurrence of this text
    #[arg(long)]
    find: Option<String>,
    /// Place the cursor at this character offset (ignored when --find is given)
    #[arg(long)]
    offset: Option<usize>,
}

impl PositionArgs {
    /// Selected text wins over an offset.
    fn into_positioning(self) -> Positioning {
        return Positioning::from_selection(self.find, self.offset);
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the workspace file a reference resolves to
    Resolve {
        /// Repository path, URL, or file:// URI
        reference: String,
        /// Treat the reference as a path on local storage
        #[arg(long)]
        location: bool,
        /// Print the match details as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve a reference and open it
    Open {
        /// Repository path, URL, or file:// URI
        reference: String,
        /// Treat the reference as a path on local storage
        #[arg(long)]
        location: bool,
        /// Cursor placement
        #[command(flatten)]
        position: PositionArgs,
    },
    /// Open both sides of a comparison; the right only if its file name differs
    Compare {
        /// Reference for the left side
        left: String,
        /// Reference for the right side
        right: String,
        /// Cursor placement
        #[command(flatten)]
        position: PositionArgs,
    },
    /// Open a changed path from a history entry
    History {
        /// Directory part of the changed path
        path: String,
        /// File name of the changed path
        name: String,
        /// Cursor placement
        #[command(flatten)]
        position: PositionArgs,
    },
    /// List workspace files
    Scan {
        /// Tree path to start from, e.g. `core/src`
        #[arg(long)]
        under: Option<String>,
        /// Only files with exactly this name
        #[arg(long)]
        name: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    return match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            return exit_code(&e);
        },
    };
}

/// Log to stderr. `RUST_LOG` wins over `-v` when set.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Not found (1) is distinct from everything else going wrong (2).
fn exit_code(e: &Error) -> ExitCode {
    return match e {
        Error::NotFound { .. } => ExitCode::from(1),
        _ => ExitCode::from(2),
    };
}

/// Dispatch a parsed command line.
///
/// # Errors
///
/// Returns errors from config loading, resolution, positioning, or opening.
fn run(cli: Cli) -> Result<(), Error> {
    let ctx = Context::load(&cli.root, cli.config.as_deref())?;

    return match cli.command {
        Commands::Resolve { reference, location, json } => commands::resolve(&ctx, &reference, location, json),
        Commands::Open { reference, location, position } => {
            let request = OpenRequest {
                positioning: position.into_positioning(),
                reference: commands::parse_source(&reference, location)?,
            };
            commands::open(&ctx, &request)
        },
        Commands::Compare { left, right, position } => {
            commands::compare(&ctx, &left, &right, &position.into_positioning())
        },
        Commands::History { path, name, position } => {
            commands::history(&ctx, &path, &name, position.into_positioning())
        },
        Commands::Scan { under, name } => commands::scan(&ctx, under.as_deref(), name.as_deref()),
    };
}
