//! pr-report: print one GitHub pull request as a plain-text report.
//!
//! Changes into the configured working directory, checks that it is a git
//! repository with an `origin` remote, then fetches the pull request's
//! metadata, comments and changed files with a single GraphQL query and
//! writes them out in API order.

pub mod cli;
pub mod display;
pub mod error;
pub mod github;
pub mod graphql;
pub mod local;
pub mod run;
#[cfg(test)]
mod test_support;
pub mod types;
pub mod workdir;

pub use cli::{Config, parse_args, parse_args_with_env};
pub use display::write_report;
pub use error::{QueryError, ReportError};
pub use github::{Forge, GitHub};
pub use run::{prepare, report, run};
pub use types::{
    ChangedFile, Comment, PullRequestReport, PullRequestTarget, RemoteInfo, Repo, RepoError, Token,
    TokenSource,
};
