use std::sync::Arc;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::AppState;
use crate::models::user_repos::UserReposResponse;


#[derive(Debug, Serialize)]
pub struct ApiSuccessViewModel {
    pub success: bool,
    #[serde(flatten)]
    pub data: UserReposResponse,
}

#[axum_macros::debug_handler]
pub async fn get_user_repos(
    Path(username): Path<String>,
    Query(query): Query<super::AffiliationQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = state.github_repo_service
        .get_user_repos_with_stats(&username, query.include_all())
        .await;

    match result {
        Ok(data) => Json(ApiSuccessViewModel { success: true, data }).into_response(),
        Err(err) => super::get_github_error_response(&username, &err),
    }
}
