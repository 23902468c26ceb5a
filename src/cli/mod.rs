//! Command-line interface.
//!
//! # Data Flow
//! ```text
//! argv
//!     → GlobalArgs (clap: -s, -v, -c, then the subcommand words)
//!     → config file + global overrides → ServiceConfig
//!     → SUBCOMMANDS table lookup by first word
//!     → subcommand handler (own clap flags, own positional checks)
//! ```
//!
//! # Design Decisions
//! - Subcommands are a static table of name, description and handler
//! - Configuration reaches handlers as a value, never as process globals
//! - Every failure maps to exit status 1; help output exits 0

pub mod repo;
pub mod serve;

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use thiserror::Error;

use crate::config::{read_config, ConfigError, ServiceConfig};
use crate::routing::RouteError;
use crate::storage::StorageError;

/// A subcommand entry.
pub struct Subcommand {
    pub name: &'static str,
    pub description: &'static str,
    pub run: fn(ServiceConfig, &[String]) -> Result<(), CliError>,
}

/// Every subcommand, in the order usage lists them.
pub const SUBCOMMANDS: &[Subcommand] = &[
    Subcommand {
        name: "serve",
        description: "start an HTTP server to serve VCS repository data",
        run: serve::run,
    },
    Subcommand {
        name: "repo",
        description: "display information about a repository",
        run: repo::run,
    },
];

/// Options accepted before the subcommand.
#[derive(Debug, Parser)]
#[command(
    name = "vcsstore",
    about = "vcsstore caches and serves information about VCS repositories.",
    after_help = command_list(),
)]
pub struct GlobalArgs {
    /// Storage root dir for VCS repos [default: /tmp/vcsstore]
    #[arg(short = 's', long = "storage-dir", value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Show verbose output [default: true]
    #[arg(
        short = 'v',
        long,
        value_name = "BOOL",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub verbose: Option<bool>,

    /// TOML configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand followed by its flags and arguments
    #[arg(value_name = "COMMAND", trailing_var_arg = true)]
    pub command: Vec<String>,
}

impl GlobalArgs {
    /// Loads the config file (if any) and applies the global overrides.
    pub fn resolve_config(&self) -> Result<ServiceConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServiceConfig::default(),
        };
        if let Some(dir) = &self.storage_dir {
            config.storage.dir = dir.clone();
        }
        if let Some(verbose) = self.verbose {
            config.observability.verbose = verbose;
        }
        Ok(config)
    }
}

/// Errors that end the process.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Args(#[from] clap::Error),

    #[error("no command given\n\n{list}", list = command_list())]
    MissingSubcommand,

    #[error("unknown subcommand {0:?}\n\n{list}", list = command_list())]
    UnknownSubcommand(String),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("invalid clone URL {url:?}: {source}")]
    CloneUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Routes(#[from] RouteError),

    #[error("HTTP server failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("metrics exporter failed to start: {0}")]
    Metrics(String),
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit_status(&self) -> u8 {
        match self {
            // --help and --version are reported through clap as errors.
            CliError::Args(e) if !e.use_stderr() => 0,
            _ => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// Writes the error to the diagnostic stream (stdout for help output).
    pub fn report(&self) {
        match self {
            CliError::Args(e) => {
                e.print().ok();
            }
            other => eprintln!("vcsstore: {other}"),
        }
    }
}

/// Table of subcommands as printed in usage messages.
pub fn command_list() -> String {
    let mut out = String::from("The commands are:\n\n");
    for c in SUBCOMMANDS {
        writeln!(out, "    {:<14} {}", c.name, c.description).ok();
    }
    out.push_str("\nUse \"vcsstore <command> -h\" for more information about a command.");
    out
}

/// Looks up a subcommand by name.
pub fn find_subcommand(name: &str) -> Option<&'static Subcommand> {
    SUBCOMMANDS.iter().find(|c| c.name == name)
}

/// Parses `args` (including the program name) and runs the subcommand.
pub fn run<I, T>(args: I) -> Result<(), CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let global = GlobalArgs::try_parse_from(args)?;
    let (name, rest) = global
        .command
        .split_first()
        .ok_or(CliError::MissingSubcommand)?;
    let subcommand =
        find_subcommand(name).ok_or_else(|| CliError::UnknownSubcommand(name.clone()))?;

    let config = global.resolve_config()?;
    (subcommand.run)(config, rest)
}

/// Builds the argv a subcommand's own parser sees.
pub(crate) fn subcommand_argv<'a>(
    name: &'static str,
    args: &'a [String],
) -> impl Iterator<Item = String> + 'a {
    std::iter::once(name.to_string()).chain(args.iter().cloned())
}
