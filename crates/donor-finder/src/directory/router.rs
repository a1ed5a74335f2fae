use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::debug;

use super::detail::{request_enrichment, DetailController, DetailState, EnrichmentTracker};
use super::grid::{GridController, LoadState, MAX_PAGE};
use super::search::SearchControls;
use crate::api::{DonorApi, Ein, Organization, SearchFilters, SearchType};
use crate::error::AppError;
use crate::presentation::{donor_href, render_detail, render_home, render_not_found};

#[derive(Clone)]
pub(crate) struct DirectoryState {
    api: Arc<dyn DonorApi>,
    enrichments: EnrichmentTracker,
}

/// Router serving the browse/search page, donor profiles and the raw
/// organization record as JSON.
pub fn directory_router(api: Arc<dyn DonorApi>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/donor/:ein", get(detail_handler))
        .route("/donor/:ein/enrich", post(enrich_handler))
        .route("/api/donor/:ein", get(organization_json_handler))
        .with_state(DirectoryState {
            api,
            enrichments: EnrichmentTracker::new(),
        })
}

/// Query string of the grid page. Values arrive as text so that empty form
/// fields ("All types", a cleared box) read as absent instead of rejecting the
/// request.
#[derive(Debug, Default, Deserialize)]
pub struct GridQuery {
    pub page: Option<String>,
    pub q: Option<String>,
    pub search_type: Option<String>,
    pub subseccd: Option<String>,
    pub limit: Option<String>,
}

impl GridQuery {
    pub fn page(&self) -> u32 {
        parse_present(self.page.as_deref())
            .unwrap_or(1)
            .clamp(1, MAX_PAGE)
    }

    pub fn filters(&self) -> SearchFilters {
        let defaults = SearchFilters::defaults();
        SearchFilters {
            q: self
                .q
                .as_deref()
                .filter(|q| !q.trim().is_empty())
                .map(str::to_string),
            subseccd: parse_present(self.subseccd.as_deref()),
            search_type: parse_present::<SearchType>(self.search_type.as_deref())
                .or(defaults.search_type),
            limit: parse_present::<u32>(self.limit.as_deref())
                .filter(|limit| *limit > 0)
                .or(defaults.limit),
        }
    }
}

fn parse_present<T: std::str::FromStr>(raw: Option<&str>) -> Option<T> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse().ok())
}

pub(crate) async fn home_handler(
    State(DirectoryState { api, .. }): State<DirectoryState>,
    Query(query): Query<GridQuery>,
) -> Response {
    let filters = query.filters();
    let page = query.page();

    let mut grid = GridController::new();
    if filters.has_query() {
        grid.search(api.as_ref(), filters.clone()).await;
    }
    grid.go_to_page(api.as_ref(), page).await;

    let mut controls = SearchControls::from_filters(filters);
    if controls.draft().subseccd.is_some() {
        controls.toggle_filters();
    }
    let status = match grid.state() {
        LoadState::Failed(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    (status, Html(render_home(&grid, &controls))).into_response()
}

pub(crate) async fn detail_handler(
    State(state): State<DirectoryState>,
    Path(raw_ein): Path<String>,
) -> Response {
    let Ok(ein) = raw_ein.parse::<Ein>() else {
        debug!(ein = %raw_ein, "rejecting malformed ein");
        return (StatusCode::NOT_FOUND, Html(render_not_found())).into_response();
    };

    let mut controller = DetailController::new(ein);
    if state.enrichments.is_running(ein) {
        controller.begin_enrichment();
    }
    controller.load(state.api.as_ref()).await;

    let status = match controller.state() {
        DetailState::Ready(_) => StatusCode::OK,
        DetailState::NotFound => StatusCode::NOT_FOUND,
        DetailState::Failed(_) => StatusCode::BAD_GATEWAY,
        DetailState::Idle | DetailState::Loading => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Html(render_detail(&controller))).into_response()
}

pub(crate) async fn enrich_handler(
    State(state): State<DirectoryState>,
    Path(raw_ein): Path<String>,
) -> Response {
    let Ok(ein) = raw_ein.parse::<Ein>() else {
        return (StatusCode::NOT_FOUND, Html(render_not_found())).into_response();
    };

    let Some(claim) = state.enrichments.claim(ein) else {
        debug!(%ein, "enrichment already in flight");
        return Redirect::to(&donor_href(ein)).into_response();
    };

    // A failed trigger is logged; the profile page still renders.
    let _ = request_enrichment(state.api.as_ref(), ein).await;
    drop(claim);
    Redirect::to(&donor_href(ein)).into_response()
}

/// Organization record as the donor service returned it. Errors answer with
/// `{"error": ...}`: malformed EIN 400, unknown donor 404, upstream failure 502.
pub(crate) async fn organization_json_handler(
    State(state): State<DirectoryState>,
    Path(raw_ein): Path<String>,
) -> Result<Json<Organization>, AppError> {
    let ein: Ein = raw_ein.parse()?;
    let organization = state.api.get_organization(ein).await?;
    Ok(Json(organization))
}
