pub mod api;
pub mod index;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::errors::GitHubError;


#[derive(Debug, Deserialize)]
pub struct AffiliationQuery {
    #[serde(rename = "allAffiliations")]
    all_affiliations: Option<String>,
}

impl AffiliationQuery {
    // Only the literal "true" widens the affiliation filter.
    pub fn include_all(&self) -> bool {
        self.all_affiliations.as_deref() == Some("true")
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorViewModel {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorViewModel,
}

pub fn get_error_response(status: StatusCode, message: &str) -> Response {
    let body = ErrorEnvelope {
        success: false,
        error: ErrorViewModel { message: message.into() },
    };
    (status, Json(body)).into_response()
}

pub fn get_github_error_response(username: &str, err: &GitHubError) -> Response {
    log::error!("Error fetching GitHub data for {}: {:?}", username, err);
    let (status, message) = err.status_code();
    get_error_response(status, message)
}
