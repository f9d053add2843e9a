use airmozilla_common::Slug;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::domain::AppState;
use crate::domain::sidebar::assemble;
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::auth::OptionalUser;
use crate::infrastructure::http::handlers::context::dto::{AnalyticsResponse, SidebarResponse};
use crate::infrastructure::http::querystring::QueryString;

mod dto;

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct SidebarParams {
    pub path: String,
    pub channels: Vec<String>,
}

/// Sidebar of the page at `path`; `null` for pages without one
pub async fn sidebar<S: AppState>(
    State(state): State<S>,
    OptionalUser(viewer): OptionalUser,
    QueryString(params): QueryString<SidebarParams>,
) -> Result<ApiSuccess<Option<SidebarResponse>>, ApiError> {
    // malformed slugs can't name a channel
    let requested: Vec<Slug> = params
        .channels
        .iter()
        .filter_map(|channel| Slug::try_new(channel).ok())
        .collect();
    let path = if params.path.is_empty() { "/" } else { &params.path };

    let sidebar = assemble(&state, path, &requested, viewer.as_ref()).await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        sidebar.map(SidebarResponse::from),
    ))
}

pub async fn analytics<S: AppState>(State(state): State<S>) -> ApiSuccess<AnalyticsResponse> {
    ApiSuccess::new(
        StatusCode::OK,
        AnalyticsResponse {
            include_analytics: state.config().include_analytics,
        },
    )
}
