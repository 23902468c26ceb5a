//! `vcsstore repo`: show where a repository is stored.

use std::io::{self, Write};
use std::path::Path;

use clap::Parser;
use url::Url;

use crate::cli::{subcommand_argv, CliError};
use crate::config::ServiceConfig;
use crate::storage::{flat_repository_path, hashed_repository_path};

/// Displays the directories a repository is stored in under each layout.
#[derive(Debug, Parser)]
#[command(name = "repo", bin_name = "vcsstore repo")]
pub struct RepoArgs {
    /// VCS type (e.g. git or hg)
    #[arg(value_name = "VCS-TYPE")]
    pub vcs_type: String,

    /// Repository clone URL
    #[arg(value_name = "CLONE-URL")]
    pub clone_url: String,
}

pub fn run(config: ServiceConfig, args: &[String]) -> Result<(), CliError> {
    let repo_args = RepoArgs::try_parse_from(subcommand_argv("repo", args))?;
    let clone_url = Url::parse(&repo_args.clone_url).map_err(|source| CliError::CloneUrl {
        url: repo_args.clone_url.clone(),
        source,
    })?;

    print_repository_paths(
        &mut io::stdout().lock(),
        &config.storage.dir,
        &repo_args.vcs_type,
        &clone_url,
    )?;
    Ok(())
}

/// Writes both storage locations of a repository, one per line.
pub fn print_repository_paths(
    out: &mut impl Write,
    root: &Path,
    vcs_type: &str,
    clone_url: &Url,
) -> io::Result<()> {
    writeln!(
        out,
        "RepositoryPath:       {}",
        root.join(flat_repository_path(vcs_type, clone_url)).display()
    )?;
    writeln!(
        out,
        "HashedRepositoryPath: {}",
        root.join(hashed_repository_path(vcs_type, clone_url)).display()
    )
}
