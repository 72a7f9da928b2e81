use std::{io, path::PathBuf};

use thiserror::Error;

use crate::types::PullRequestTarget;

/// Exit code for a working-directory or output failure.
pub const EXIT_CONFIG: i32 = 1;
/// Exit code for a local repository or remote failure.
pub const EXIT_REPOSITORY: i32 = 9;
/// Exit code for a client or query failure.
pub const EXIT_QUERY: i32 = 10;

/// Reasons a GraphQL query did not produce a report.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("GitHub rejected the credentials (HTTP 401): {message}")]
    Unauthorized { message: String },

    #[error("GitHub API rate limit exceeded (HTTP {status}): {message}")]
    RateLimited { status: u16, message: String },

    #[error("GitHub API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("pull request {0} not found")]
    NotFound(PullRequestTarget),

    #[error("{0}")]
    Transport(#[source] octocrab::Error),
}

impl QueryError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, QueryError::Unauthorized { .. })
    }
}

/// Terminal failure of a run. Each variant maps to one exit code.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to change directory to {}: {source}", .path.display())]
    ChangeDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error opening repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("error getting remote '{name}': {source}")]
    Remote {
        name: String,
        #[source]
        source: git2::Error,
    },

    #[error("failed to create GitHub client: {0}")]
    Client(#[source] octocrab::Error),

    #[error("error querying: {source}{}", token_hint(.missing_token, .source))]
    Query {
        #[source]
        source: QueryError,
        missing_token: bool,
    },

    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}

fn token_hint(missing_token: &bool, source: &QueryError) -> &'static str {
    if *missing_token || source.is_unauthorized() {
        ", did you forget GH_TOKEN?"
    } else {
        ""
    }
}

impl ReportError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ReportError::ChangeDirectory { .. } | ReportError::Output(_) => EXIT_CONFIG,
            ReportError::OpenRepository(_) | ReportError::Remote { .. } => EXIT_REPOSITORY,
            ReportError::Client(_) | ReportError::Query { .. } => EXIT_QUERY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        let chdir = ReportError::ChangeDirectory {
            path: PathBuf::from("/nowhere"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(chdir.exit_code(), 1);

        let open = ReportError::OpenRepository(git2::Error::from_str("not a repo"));
        assert_eq!(open.exit_code(), 9);

        let query = ReportError::Query {
            source: QueryError::GraphQl("boom".to_string()),
            missing_token: false,
        };
        assert_eq!(query.exit_code(), 10);
    }

    #[test]
    fn test_query_error_hints_at_token() {
        let unauthorized = ReportError::Query {
            source: QueryError::Unauthorized {
                message: "Bad credentials".to_string(),
            },
            missing_token: false,
        };
        assert_eq!(
            unauthorized.to_string(),
            "error querying: GitHub rejected the credentials (HTTP 401): Bad credentials, did you forget GH_TOKEN?"
        );

        let graphql = ReportError::Query {
            source: QueryError::GraphQl("Field 'x' doesn't exist".to_string()),
            missing_token: false,
        };
        assert!(!graphql.to_string().contains("GH_TOKEN"));

        let tokenless = ReportError::Query {
            source: QueryError::GraphQl("Field 'x' doesn't exist".to_string()),
            missing_token: true,
        };
        assert!(tokenless.to_string().ends_with("did you forget GH_TOKEN?"));
    }
}
