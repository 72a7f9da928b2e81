use std::{io::Write, path::Path};

use tracing::debug;

use crate::{
    cli::Config,
    display::write_report,
    error::ReportError,
    github::{Forge, GitHub},
    local::inspect_origin,
    types::{PullRequestTarget, RemoteInfo, TokenSource},
    workdir::enter_working_directory,
};

/// Enters the configured working directory and inspects the local
/// repository, printing the notices `config` opts into.
///
/// Runs entirely before any network access.
pub fn prepare<W: Write>(config: &Config, writer: &mut W) -> Result<RemoteInfo, ReportError> {
    let workdir = config.workdir.as_deref();
    if enter_working_directory(workdir)? && config.announce_chdir {
        if let Some(path) = workdir {
            writeln!(writer, "Changed working directory to: {}", path.display())?;
        }
    }

    let remote = inspect_origin(Path::new("."))?;
    if config.show_remote_url {
        if let Some(url) = remote.first_url() {
            writeln!(writer, "GitHub URL: {url}")?;
        }
    }

    Ok(remote)
}

/// Fetches the report for `target` from `forge` and writes it.
pub async fn report<F, W>(
    forge: &F,
    target: &PullRequestTarget,
    missing_token: bool,
    writer: &mut W,
) -> Result<(), ReportError>
where
    F: Forge + Sync,
    W: Write,
{
    let pr = forge
        .fetch_pull_request(target)
        .await
        .map_err(|source| ReportError::Query {
            source,
            missing_token,
        })?;
    debug!(
        comments = pr.comments.len(),
        files = pr.files.len(),
        "fetched pull request"
    );

    write_report(&pr, writer)?;
    Ok(())
}

/// Runs the whole program: working directory, local repository, client,
/// query, report.
pub async fn run<W: Write>(config: &Config, writer: &mut W) -> Result<(), ReportError> {
    prepare(config, writer)?;

    let github = GitHub::connect(&config.token, &config.api_base).map_err(ReportError::Client)?;
    let missing_token = config.token.source() == TokenSource::Missing;

    report(&github, &config.target, missing_token, writer).await
}
