use std::sync::Arc;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::AppState;
use crate::models::user_repos::{LanguageStat, UserReposResponse};
use crate::services::language_stats_service::OTHER_COLOR;


const CARD_WIDTH: f64 = 400.0;
const PADDING_X: f64 = 25.0;
const BAR_Y: f64 = 55.0;
const LEGEND_Y: f64 = 80.0;
const LEGEND_ROW_HEIGHT: f64 = 22.0;
const LEGEND_COLUMNS: usize = 2;
const EMPTY_HEIGHT: f64 = 90.0;

#[derive(Debug, Serialize)]
pub struct BarSegmentViewModel {
    pub x: String,
    pub y: String,
    pub width: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct LegendItemViewModel {
    pub x: String,
    pub y: String,
    pub name: String,
    pub percentage: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct LanguagesCardViewModel {
    pub title: String,
    pub width: String,
    pub height: String,
    pub border_width: String,
    pub border_height: String,
    pub bar_y: String,
    pub bar_width: String,
    pub has_languages: bool,
    pub segments: Vec<BarSegmentViewModel>,
    pub legend: Vec<LegendItemViewModel>,
}

impl LanguagesCardViewModel {
    pub fn new(data: &UserReposResponse) -> Self {
        let stats = &data.language_stats;
        let bar_width = CARD_WIDTH - PADDING_X * 2.0;
        let column_width = bar_width / LEGEND_COLUMNS as f64;

        let mut segments = Vec::with_capacity(stats.len());
        let mut offset = PADDING_X;
        for stat in stats {
            let width = stat.percentage / 100.0 * bar_width;
            segments.push(BarSegmentViewModel {
                x: format_px(offset),
                y: format_px(BAR_Y),
                width: format_px(width),
                color: stat_color(stat),
            });
            offset += width;
        }

        let legend = stats
            .iter()
            .enumerate()
            .map(|(i, stat)| LegendItemViewModel {
                x: format_px(PADDING_X + (i % LEGEND_COLUMNS) as f64 * column_width),
                y: format_px(LEGEND_Y + (i / LEGEND_COLUMNS) as f64 * LEGEND_ROW_HEIGHT),
                name: stat.name.clone(),
                percentage: format!("{:.2}", stat.percentage),
                color: stat_color(stat),
            })
            .collect();

        let rows = (stats.len() + LEGEND_COLUMNS - 1) / LEGEND_COLUMNS;
        let height = if stats.is_empty() {
            EMPTY_HEIGHT
        } else {
            LEGEND_Y + rows as f64 * LEGEND_ROW_HEIGHT + 10.0
        };

        LanguagesCardViewModel {
            title: data.title.clone(),
            width: format_px(CARD_WIDTH),
            height: format_px(height),
            border_width: format_px(CARD_WIDTH - 1.0),
            border_height: format_px(height - 1.0),
            bar_y: format_px(BAR_Y),
            bar_width: format_px(bar_width),
            has_languages: !stats.is_empty(),
            segments,
            legend,
        }
    }
}

fn stat_color(stat: &LanguageStat) -> String {
    stat.color.clone().unwrap_or_else(|| OTHER_COLOR.into())
}

fn format_px(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    formatted.trim_end_matches('0').trim_end_matches('.').to_string()
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

    let data = match result {
        Ok(data) => data,
        Err(err) => return super::get_github_error_response(&username, &err),
    };

    let view_model = LanguagesCardViewModel::new(&data);
    match state.registry.render("languages", &view_model) {
        Ok(svg) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/svg+xml")],
            svg,
        ).into_response(),
        Err(err) => {
            log::error!("Failed to render languages card for {}: {:?}", username, err);
            super::get_error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render GitHub data")
        }
    }
}
