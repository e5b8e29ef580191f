pub mod github_graphql;
pub mod user_repos;
