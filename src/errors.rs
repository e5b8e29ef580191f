use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("User not found")]
    UserNotFound,

    #[error("API rate limit exceeded")]
    RateLimited,

    #[error("{0}")]
    GraphQL(String),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl GitHubError {
    /// Status code and client-facing message for this error.
    ///
    /// Matches on the message text so GraphQL errors that report rate
    /// limiting are answered with 429 as well.
    pub fn status_code(&self) -> (StatusCode, &'static str) {
        let message = self.to_string();
        if message.to_lowercase().contains("user not found") {
            (StatusCode::NOT_FOUND, "GitHub user not found")
        } else if message.contains("API rate limit exceeded") {
            (StatusCode::TOO_MANY_REQUESTS, "GitHub API rate limit exceeded")
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch GitHub data")
        }
    }
}
