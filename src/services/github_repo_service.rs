use reqwest::Client;

use crate::entities::repository::Repository;
use crate::errors::GitHubError;
use crate::mappers::repository_mapper;
use crate::models::github_graphql::{
    GraphQLError, GraphQLRequest, GraphQLResponse, RepositoriesData, RepositoriesVariables,
};
use crate::models::user_repos::UserReposResponse;
use crate::services::language_stats_service;

pub const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

const OWNER_AFFILIATIONS: &[&str] = &["OWNER"];
const ALL_AFFILIATIONS: &[&str] = &["OWNER", "COLLABORATOR", "ORGANIZATION_MEMBER"];

const REPOSITORIES_QUERY: &str = r#"
query ($username: String!, $cursor: String, $affiliations: [RepositoryAffiliation]) {
  user(login: $username) {
    repositories(
      first: 100,
      after: $cursor,
      ownerAffiliations: $affiliations,
      orderBy: { field: UPDATED_AT, direction: DESC },
      isFork: false
    ) {
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        id
        name
        url
        primaryLanguage {
          name
          color
        }
        languages(first: 50, orderBy: { field: SIZE, direction: DESC }) {
          edges {
            size
            node {
              name
              color
            }
          }
        }
      }
    }
  }
}
"#;

pub struct GitHubRepoService {
    pub client: Client,
    pub token: Option<String>,
    pub graphql_url: String,
}

impl GitHubRepoService {
    pub fn with_graphql_url(client: Client, token: Option<String>, graphql_url: &str) -> Self {
        if token.is_none() {
            log::warn!("No GitHub token provided - you may hit rate limits");
        }
        GitHubRepoService {
            client,
            token,
            graphql_url: graphql_url.to_string(),
        }
    }

    /// Fetch repositories with their language breakdown and aggregate the
    /// overall language stats.
    pub async fn get_user_repos_with_stats(
        &self,
        username: &str,
        include_all_affiliations: bool,
    ) -> Result<UserReposResponse, GitHubError> {
        let repositories = self.fetch_repositories(username, include_all_affiliations).await?;
        let language_stats = language_stats_service::calculate_language_stats(&repositories);

        Ok(UserReposResponse {
            title: format!("GitHub Repositories of {}", username),
            username: username.to_string(),
            repositories: repositories.iter().map(repository_mapper::to_transformed).collect(),
            language_stats,
        })
    }

    /// Walk every page of the user's non-fork repositories, newest first.
    ///
    /// Pages are requested one after another. Any failure discards the pages
    /// already collected.
    pub async fn fetch_repositories(
        &self,
        username: &str,
        include_all_affiliations: bool,
    ) -> Result<Vec<Repository>, GitHubError> {
        let affiliations = if include_all_affiliations {
            ALL_AFFILIATIONS
        } else {
            OWNER_AFFILIATIONS
        };

        let mut repositories: Vec<Repository> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0;

        loop {
            log::info!("Requesting repositories page for {}, cursor: {:?}", username, cursor);
            let data = self.fetch_page(username, cursor.as_deref(), affiliations).await?;
            pages += 1;

            let user = data.user.ok_or(GitHubError::UserNotFound)?;
            let connection = user.repositories;
            repositories.extend(
                connection
                    .nodes
                    .into_iter()
                    .flatten()
                    .map(|node| repository_mapper::to_entity(username, node)),
            );

            match (connection.page_info.has_next_page, connection.page_info.end_cursor) {
                (true, Some(end_cursor)) => cursor = Some(end_cursor),
                (true, None) => {
                    log::warn!("GitHub reported another page without a cursor for {}", username);
                    break;
                }
                (false, _) => break,
            }
        }

        log::info!("Fetched {} repositories in {} page(s) for {}", repositories.len(), pages, username);
        Ok(repositories)
    }

    async fn fetch_page(
        &self,
        username: &str,
        cursor: Option<&str>,
        affiliations: &[&str],
    ) -> Result<RepositoriesData, GitHubError> {
        let body = GraphQLRequest {
            query: REPOSITORIES_QUERY,
            variables: RepositoriesVariables {
                username,
                cursor,
                affiliations,
            },
        };

        let mut request = self.client.post(&self.graphql_url)
            .header("User-Agent", "repo-language-card")
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&body)?);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let rate_limit_exhausted = response
                .headers()
                .get("x-ratelimit-remaining")
                .map(|remaining| remaining.to_str().unwrap_or("") == "0")
                .unwrap_or(false);
            let contents = response.text().await?;
            log::error!("GitHub GraphQL request failed with {:?}: {}", status, contents);

            if status.as_u16() == 429 || (status.as_u16() == 403 && rate_limit_exhausted) {
                return Err(GitHubError::RateLimited);
            }
            if let Ok(parsed) = serde_json::from_str::<GraphQLResponse<serde_json::Value>>(&contents) {
                if let Some(errors) = parsed.errors {
                    return Err(join_errors(&errors));
                }
            }
            return Err(GitHubError::Status {
                status: status.as_u16(),
                body: contents,
            });
        }

        let contents = response.text().await?;
        let parsed: GraphQLResponse<serde_json::Value> = serde_json::from_str(&contents)?;

        if let Some(errors) = parsed.errors {
            let err = join_errors(&errors);
            log::error!("GitHub GraphQL errors for {}: {}", username, err);
            return Err(err);
        }

        match parsed.data {
            Some(data) if !data.is_null() => Ok(serde_json::from_value(data)?),
            _ => Ok(RepositoriesData { user: None }),
        }
    }
}

fn join_errors(errors: &[GraphQLError]) -> GitHubError {
    GitHubError::GraphQL(
        errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<&str>>()
            .join("\n"),
    )
}
