pub mod github_repo_service;
pub mod language_stats_service;
