use serde::{Deserialize, Serialize};

/// Request body posted to the GraphQL endpoint.
#[derive(Debug, Serialize)]
pub struct GraphQLRequest<'a> {
    pub query: &'a str,
    pub variables: RepositoriesVariables<'a>,
}

#[derive(Debug, Serialize)]
pub struct RepositoriesVariables<'a> {
    pub username: &'a str,
    pub cursor: Option<&'a str>,
    pub affiliations: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RepositoriesData {
    pub user: Option<UserRepositories>,
}

#[derive(Debug, Deserialize)]
pub struct UserRepositories {
    pub repositories: RepositoryConnection,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryConnection {
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
    #[serde(default)]
    pub nodes: Vec<Option<RepositoryNode>>,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "endCursor")]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryNode {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "primaryLanguage")]
    pub primary_language: Option<LanguageNode>,
    pub languages: Option<LanguageConnection>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageConnection {
    #[serde(default)]
    pub edges: Vec<LanguageEdge>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageEdge {
    pub size: Option<u64>,
    pub node: LanguageNode,
}

#[derive(Debug, Deserialize)]
pub struct LanguageNode {
    pub name: String,
    pub color: Option<String>,
}
