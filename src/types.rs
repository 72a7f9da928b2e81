use std::fmt;

use thiserror::Error;

/// Placeholder login for authors GitHub no longer knows about.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Largest pull request number GraphQL's 32-bit `Int` can carry.
pub const MAX_PR_NUMBER: u64 = i32::MAX as u64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoError {
    #[error("repository must be in format 'owner/repo', got: '{0}'")]
    InvalidFormat(String),
    #[error("failed to parse URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("URL must be in format https://github.com/owner/repo/pull/123, got: '{0}'")]
    NotAPullRequestUrl(String),
    #[error("invalid PR number: '{0}'")]
    InvalidNumber(String),
    #[error("PR number {0} is out of range (1..=2147483647)")]
    NumberOutOfRange(u64),
}

/// Parses a pull request number, rejecting values GitHub cannot accept.
pub fn parse_pr_number(number: &str) -> Result<u64, RepoError> {
    let number = number.trim();
    let value: u64 = number
        .parse()
        .map_err(|_| RepoError::InvalidNumber(number.to_string()))?;
    if !(1..=MAX_PR_NUMBER).contains(&value) {
        return Err(RepoError::NumberOutOfRange(value));
    }
    Ok(value)
}

/// A GitHub repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo {
    owner: String,
    name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, RepoError> {
        let owner = owner.into();
        let name = name.into();
        if owner.is_empty() || name.is_empty() || owner.contains('/') || name.contains('/') {
            return Err(RepoError::InvalidFormat(format!("{owner}/{name}")));
        }
        Ok(Self { owner, name })
    }

    /// Parses `owner/repo`.
    pub fn parse(repo: &str) -> Result<Self, RepoError> {
        let (owner, name) = repo
            .trim()
            .split_once('/')
            .ok_or_else(|| RepoError::InvalidFormat(repo.to_string()))?;
        Self::new(owner, name).map_err(|_| RepoError::InvalidFormat(repo.to_string()))
    }

    /// Parses `https://github.com/owner/repo/pull/123` into the repository
    /// and pull request number.
    pub fn parse_pr_url(url_str: &str) -> Result<(Self, u64), RepoError> {
        let url = url::Url::parse(url_str).map_err(|e| RepoError::InvalidUrl {
            url: url_str.to_string(),
            reason: e.to_string(),
        })?;

        if url.host_str() != Some("github.com") {
            return Err(RepoError::NotAPullRequestUrl(url_str.to_string()));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        // ["owner", "repo", "pull", "123"]
        let [owner, name, "pull", number] = segments.as_slice() else {
            return Err(RepoError::NotAPullRequestUrl(url_str.to_string()));
        };

        let number = parse_pr_number(number)?;
        let repo = Self::new(*owner, *name)
            .map_err(|_| RepoError::NotAPullRequestUrl(url_str.to_string()))?;

        Ok((repo, number))
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The single pull request a run reports on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestTarget {
    pub repo: Repo,
    pub number: u64,
}

impl fmt::Display for PullRequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

/// Where the bearer token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Primary,
    Fallback,
    Missing,
}

/// Bearer token sent with every API request.
///
/// The value is never printed; `Debug` only shows where it came from.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    source: TokenSource,
}

impl Token {
    pub fn new(value: impl Into<String>, source: TokenSource) -> Self {
        Self {
            value: value.into(),
            source,
        }
    }

    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> TokenSource {
        self.source
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// URLs configured for a remote of the local repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    pub name: String,
    pub urls: Vec<String>,
}

impl RemoteInfo {
    pub fn first_url(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub author: String,
    pub body: String,
    /// `createdAt` exactly as GitHub returned it.
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub path: String,
    pub additions: u64,
    pub deletions: u64,
}

/// Pull request metadata, comments and changed files as returned by one
/// query, in API order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestReport {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub created_at: String,
    pub author: String,
    pub comments: Vec<Comment>,
    pub files: Vec<ChangedFile>,
}
