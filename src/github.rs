use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::{debug, warn};

use crate::{
    error::QueryError,
    graphql::fetch_pull_request_report,
    types::{PullRequestReport, PullRequestTarget, Token, TokenSource},
};

/// Primary token variable.
pub const TOKEN_ENV: &str = "GH_TOKEN";
/// Consulted only when the primary variable is unset or empty.
pub const FALLBACK_TOKEN_ENV: &str = "TOKEN";
/// GraphQL requests go to `<base>/graphql`.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Source of pull request reports.
#[async_trait]
pub trait Forge {
    async fn fetch_pull_request(
        &self,
        target: &PullRequestTarget,
    ) -> Result<PullRequestReport, QueryError>;
}

/// Reads the bearer token from `primary`, falling back to `TOKEN`.
///
/// Never fails: with neither variable set the token is empty and the API
/// decides what to make of it.
pub fn resolve_token<F>(primary: &str, env: F) -> Token
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| env(name).filter(|value| !value.is_empty());

    if let Some(token) = lookup(primary) {
        return Token::new(token, TokenSource::Primary);
    }
    if let Some(token) = lookup(FALLBACK_TOKEN_ENV) {
        return Token::new(token, TokenSource::Fallback);
    }
    Token::new(String::new(), TokenSource::Missing)
}

/// Creates a client that sends `token` as a bearer credential with every
/// request to `api_base`.
pub fn build_client(token: &Token, api_base: &str) -> Result<Octocrab, octocrab::Error> {
    match token.source() {
        TokenSource::Missing => warn!(
            "neither {TOKEN_ENV} nor {FALLBACK_TOKEN_ENV} is set; querying with an empty token"
        ),
        source => debug!(?source, "using GitHub token"),
    }

    Octocrab::builder()
        .personal_token(token.expose().to_string())
        .base_uri(api_base)?
        .build()
}

/// GitHub GraphQL API.
pub struct GitHub {
    client: Octocrab,
}

impl GitHub {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    pub fn connect(token: &Token, api_base: &str) -> Result<Self, octocrab::Error> {
        build_client(token, api_base).map(Self::new)
    }
}

#[async_trait]
impl Forge for GitHub {
    async fn fetch_pull_request(
        &self,
        target: &PullRequestTarget,
    ) -> Result<PullRequestReport, QueryError> {
        fetch_pull_request_report(&self.client, target).await
    }
}
