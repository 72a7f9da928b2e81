use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    github::{DEFAULT_API_BASE, TOKEN_ENV, resolve_token},
    types::{PullRequestTarget, Repo, Token, parse_pr_number},
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

/// Directory to change into before anything else.
pub const WORKDIR_ENV: &str = "GOZERO_PWD";

pub const DEFAULT_REPO: &str = "Goddard-Technologies-LLC/ReprocessorAlpha";
pub const DEFAULT_PR_NUMBER: u64 = 69;

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory to enter before opening the repository.
    pub workdir: Option<PathBuf>,
    pub target: PullRequestTarget,
    pub token: Token,
    pub api_base: String,
    /// Print the first `origin` URL before the report.
    pub show_remote_url: bool,
    /// Print a confirmation after changing directory.
    pub announce_chdir: bool,
}

#[derive(Parser, Debug)]
#[command(
    name = "pr-report",
    about = "Print a pull request's metadata, comments and changed files from the GitHub GraphQL API"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    /// GitHub repository in format 'owner/repo'
    #[arg(short = 'r', long = "repo", value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    /// Pull request number or URL
    #[arg(short = 'p', long = "pr", value_name = "PR-NUMBER|PR-URL")]
    pub pr: Option<String>,

    /// Change to this directory first (overrides GOZERO_PWD)
    #[arg(short = 'C', long = "workdir", value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Print the URL of the local 'origin' remote before the report
    #[arg(long = "show-remote-url")]
    pub show_remote_url: bool,

    /// Print a confirmation after changing the working directory
    #[arg(long = "announce-chdir")]
    pub announce_chdir: bool,

    /// GitHub API base URL
    #[arg(long = "api-base", value_name = "URL", default_value = DEFAULT_API_BASE)]
    pub api_base: String,
}

impl CliArgs {
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api_base)
            .with_context(|| format!("Invalid API base URL: '{}'", self.api_base))?;

        let (Some(repo), Some(pr)) = (&self.repo, &self.pr) else {
            return Ok(());
        };

        if pr.trim().starts_with("https://") {
            let expected = Repo::parse(repo)
                .with_context(|| format!("Invalid repository format '{repo}'"))?;
            let (pr_repo, _) = Repo::parse_pr_url(pr.trim())?;
            if pr_repo != expected {
                anyhow::bail!(
                    "PR URL {} is from {} but --repo specifies {}",
                    pr,
                    pr_repo,
                    expected
                );
            }
        }

        Ok(())
    }
}

fn resolve_target(repo: Option<&str>, pr: Option<&str>) -> Result<PullRequestTarget> {
    let pr = pr.map(str::trim).filter(|pr| !pr.is_empty());

    if let Some(url) = pr.filter(|pr| pr.starts_with("https://")) {
        let (repo, number) = Repo::parse_pr_url(url)?;
        return Ok(PullRequestTarget { repo, number });
    }

    let repo_str = repo.unwrap_or(DEFAULT_REPO);
    let repo = Repo::parse(repo_str)
        .with_context(|| format!("Invalid repository format '{repo_str}'"))?;

    let number = match pr {
        Some(pr) => parse_pr_number(pr).with_context(|| format!("Invalid PR number: '{pr}'"))?,
        None => DEFAULT_PR_NUMBER,
    };

    Ok(PullRequestTarget { repo, number })
}

fn build_config<F>(cli: CliArgs, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    cli.validate()?;

    let target = resolve_target(cli.repo.as_deref(), cli.pr.as_deref())?;

    let workdir = cli.workdir.or_else(|| {
        env(WORKDIR_ENV)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
    });

    Ok(Config {
        workdir,
        target,
        token: resolve_token(TOKEN_ENV, &env),
        api_base: cli.api_base,
        show_remote_url: cli.show_remote_url,
        announce_chdir: cli.announce_chdir,
    })
}

/// Parses command-line arguments and the process environment into a
/// [`Config`].
pub fn parse_args<I, T>(args: I) -> Result<Config>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    parse_args_with_env(args, |name| std::env::var(name).ok())
}

/// Like [`parse_args`], reading environment variables through `env`.
pub fn parse_args_with_env<I, T, F>(args: I, env: F) -> Result<Config>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    F: Fn(&str) -> Option<String>,
{
    let cli = CliArgs::try_parse_from(args)?;
    build_config(cli, env)
}
