use octocrab::Octocrab;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::QueryError,
    types::{ChangedFile, Comment, PullRequestReport, PullRequestTarget, UNKNOWN_AUTHOR},
};

/// Comments fetched per pull request. Later comments are not fetched.
pub const COMMENTS_PAGE_SIZE: usize = 50;
/// Changed files fetched per pull request. Later files are not fetched.
pub const FILES_PAGE_SIZE: usize = 100;

pub fn pull_request_query_text() -> String {
    format!(
        r#"
            query($owner: String!, $name: String!, $number: Int!) {{
                repository(owner: $owner, name: $name) {{
                    pullRequest(number: $number) {{
                        number
                        title
                        state
                        createdAt
                        author {{
                            login
                        }}
                        comments(first: {COMMENTS_PAGE_SIZE}) {{
                            nodes {{
                                author {{
                                    login
                                }}
                                body
                                createdAt
                            }}
                            pageInfo {{
                                hasNextPage
                            }}
                        }}
                        files(first: {FILES_PAGE_SIZE}) {{
                            nodes {{
                                path
                                additions
                                deletions
                            }}
                            pageInfo {{
                                hasNextPage
                            }}
                        }}
                    }}
                }}
            }}
        "#
    )
}

pub fn create_graphql_query(target: &PullRequestTarget) -> serde_json::Value {
    serde_json::json!({
        "query": pull_request_query_text(),
        "variables": {
            "owner": target.repo.owner(),
            "name": target.repo.name(),
            "number": target.number,
        }
    })
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse {
    pub data: Option<RepositoryData>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryData {
    pub repository: Option<GraphQLRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRepository {
    pub pull_request: Option<GraphQLPullRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLPullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub created_at: String,
    pub author: Option<GraphQLAuthor>,
    pub comments: GraphQLConnection<GraphQLComment>,
    // Null for pull requests too large for GitHub to list.
    #[serde(default)]
    pub files: Option<GraphQLConnection<GraphQLFile>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLAuthor {
    pub login: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLConnection<T> {
    pub nodes: Vec<T>,
    #[serde(default)]
    pub page_info: Option<PageInfo>,
}

impl<T> GraphQLConnection<T> {
    fn has_next_page(&self) -> bool {
        self.page_info.as_ref().is_some_and(|info| info.has_next_page)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLComment {
    pub author: Option<GraphQLAuthor>,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLFile {
    pub path: String,
    pub additions: u64,
    pub deletions: u64,
}

fn author_login(author: Option<GraphQLAuthor>) -> String {
    author
        .map(|a| a.login)
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

pub fn convert_comments(comments: GraphQLConnection<GraphQLComment>) -> Vec<Comment> {
    comments
        .nodes
        .into_iter()
        .map(|comment| Comment {
            author: author_login(comment.author),
            body: comment.body,
            created_at: comment.created_at,
        })
        .collect()
}

pub fn convert_files(files: Option<GraphQLConnection<GraphQLFile>>) -> Vec<ChangedFile> {
    files.map_or_else(Vec::new, |files| {
        files
            .nodes
            .into_iter()
            .map(|file| ChangedFile {
                path: file.path,
                additions: file.additions,
                deletions: file.deletions,
            })
            .collect()
    })
}

/// Converts a GraphQL pull request into a report, warning when either
/// connection was cut off at its page size.
pub fn convert_graphql_pr_to_report(graphql_pr: GraphQLPullRequest) -> PullRequestReport {
    if graphql_pr.comments.has_next_page() {
        warn!(
            "PR #{} has more than {COMMENTS_PAGE_SIZE} comments; only the first {COMMENTS_PAGE_SIZE} are shown",
            graphql_pr.number
        );
    }
    if graphql_pr
        .files
        .as_ref()
        .is_some_and(GraphQLConnection::has_next_page)
    {
        warn!(
            "PR #{} changes more than {FILES_PAGE_SIZE} files; only the first {FILES_PAGE_SIZE} are shown",
            graphql_pr.number
        );
    }

    PullRequestReport {
        number: graphql_pr.number,
        title: graphql_pr.title,
        state: graphql_pr.state,
        created_at: graphql_pr.created_at,
        author: author_login(graphql_pr.author),
        comments: convert_comments(graphql_pr.comments),
        files: convert_files(graphql_pr.files),
    }
}

/// Turns a decoded response into a report or the error it carries.
pub fn extract_report(
    response: GraphQLResponse,
    target: &PullRequestTarget,
) -> Result<PullRequestReport, QueryError> {
    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(QueryError::GraphQl(messages.join("; ")));
    }

    response
        .data
        .and_then(|data| data.repository)
        .and_then(|repository| repository.pull_request)
        .map(convert_graphql_pr_to_report)
        .ok_or_else(|| QueryError::NotFound(target.clone()))
}

/// Sorts an Octocrab failure into the query error taxonomy.
pub fn classify_octocrab_error(error: octocrab::Error) -> QueryError {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            let message = source.message.clone();
            match status {
                401 => QueryError::Unauthorized { message },
                403 | 429 if message.to_lowercase().contains("rate limit") => {
                    QueryError::RateLimited { status, message }
                }
                _ => QueryError::Api { status, message },
            }
        }
        other => QueryError::Transport(other),
    }
}

/// Executes the pull request query and decodes the result.
pub async fn fetch_pull_request_report(
    octocrab: &Octocrab,
    target: &PullRequestTarget,
) -> Result<PullRequestReport, QueryError> {
    let query = create_graphql_query(target);
    debug!(%target, "querying pull request");

    let response: GraphQLResponse = octocrab
        .graphql(&query)
        .await
        .map_err(classify_octocrab_error)?;

    extract_report(response, target)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::Repo;

    fn target() -> PullRequestTarget {
        PullRequestTarget {
            repo: Repo::new("Org", "Repo").unwrap(),
            number: 69,
        }
    }

    fn decode(value: serde_json::Value) -> GraphQLResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_query_requests_fixed_page_sizes() {
        let text = pull_request_query_text();
        assert!(text.contains("comments(first: 50)"));
        assert!(text.contains("files(first: 100)"));
        assert!(text.contains("pullRequest(number: $number)"));
    }

    #[test]
    fn test_query_variables_carry_target() {
        let query = create_graphql_query(&target());
        assert_eq!(query["variables"]["owner"], "Org");
        assert_eq!(query["variables"]["name"], "Repo");
        assert_eq!(query["variables"]["number"], 69);
    }

    #[test]
    fn test_extract_report_keeps_api_order() {
        let response = decode(json!({
            "data": {
                "repository": {
                    "pullRequest": {
                        "number": 69,
                        "title": "Fix bug",
                        "state": "OPEN",
                        "createdAt": "2024-01-15T10:00:00Z",
                        "author": { "login": "alice" },
                        "comments": {
                            "nodes": [
                                { "author": { "login": "bob" }, "body": "first", "createdAt": "2024-01-15T11:00:00Z" },
                                { "author": null, "body": "second", "createdAt": "2024-01-15T12:00:00Z" }
                            ],
                            "pageInfo": { "hasNextPage": false }
                        },
                        "files": {
                            "nodes": [
                                { "path": "src/b.rs", "additions": 3, "deletions": 1 },
                                { "path": "src/a.rs", "additions": 0, "deletions": 7 }
                            ],
                            "pageInfo": { "hasNextPage": false }
                        }
                    }
                }
            }
        }));

        let report = extract_report(response, &target()).unwrap();

        assert_eq!(report.number, 69);
        assert_eq!(report.author, "alice");
        let bodies: Vec<&str> = report.comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, ["first", "second"]);
        assert_eq!(report.comments[1].author, UNKNOWN_AUTHOR);
        let paths: Vec<&str> = report.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["src/b.rs", "src/a.rs"]);
        assert_eq!(report.files[1].deletions, 7);
    }

    #[test]
    fn test_timestamps_pass_through_unchanged() {
        let response = decode(json!({
            "data": {
                "repository": {
                    "pullRequest": {
                        "number": 3,
                        "title": "Offsets",
                        "state": "CLOSED",
                        "createdAt": "2024-01-15T10:00:00.123+02:00",
                        "author": { "login": "alice" },
                        "comments": {
                            "nodes": [{ "author": { "login": "bob" }, "body": "hi", "createdAt": "2024-01-15T11:00:00Z" }]
                        },
                        "files": { "nodes": [] }
                    }
                }
            }
        }));

        let report = extract_report(response, &target()).unwrap();
        assert_eq!(report.created_at, "2024-01-15T10:00:00.123+02:00");
        assert_eq!(report.comments[0].created_at, "2024-01-15T11:00:00Z");
    }

    #[test]
    fn test_extract_report_null_files() {
        let response = decode(json!({
            "data": {
                "repository": {
                    "pullRequest": {
                        "number": 1,
                        "title": "Huge",
                        "state": "MERGED",
                        "createdAt": "2024-01-15T10:00:00Z",
                        "author": { "login": "alice" },
                        "comments": { "nodes": [] },
                        "files": null
                    }
                }
            }
        }));

        let report = extract_report(response, &target()).unwrap();
        assert!(report.files.is_empty());
        assert!(report.comments.is_empty());
    }

    #[test]
    fn test_extract_report_graphql_errors() {
        let response = decode(json!({
            "data": null,
            "errors": [
                { "message": "Something went wrong" },
                { "message": "And another thing" }
            ]
        }));

        let err = extract_report(response, &target()).unwrap_err();
        match err {
            QueryError::GraphQl(message) => {
                assert_eq!(message, "Something went wrong; And another thing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extract_report_missing_pull_request() {
        let response = decode(json!({
            "data": { "repository": { "pullRequest": null } }
        }));

        let err = extract_report(response, &target()).unwrap_err();
        assert!(matches!(err, QueryError::NotFound(_)));
        assert_eq!(err.to_string(), "pull request Org/Repo#69 not found");
    }

    #[test]
    fn test_truncated_connections_still_convert() {
        let response = decode(json!({
            "data": {
                "repository": {
                    "pullRequest": {
                        "number": 2,
                        "title": "Busy",
                        "state": "OPEN",
                        "createdAt": "2024-01-15T10:00:00Z",
                        "author": { "login": "alice" },
                        "comments": {
                            "nodes": [{ "author": { "login": "bob" }, "body": "hi", "createdAt": "2024-01-15T10:00:00Z" }],
                            "pageInfo": { "hasNextPage": true }
                        },
                        "files": {
                            "nodes": [{ "path": "a", "additions": 1, "deletions": 0 }],
                            "pageInfo": { "hasNextPage": true }
                        }
                    }
                }
            }
        }));

        let report = extract_report(response, &target()).unwrap();
        assert_eq!(report.comments.len(), 1);
        assert_eq!(report.files.len(), 1);
    }
}
