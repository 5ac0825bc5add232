use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use fareline_core::{PageSpec, SearchPage};
use serde::Deserialize;
use tracing::info;
use crate::{error::AppError, state::AppState};

/// Raw query values; parsed by [`PageSpec::from_query`] so a non-numeric
/// value surfaces as our own 400 body rather than an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub page: Option<String>,
    pub items: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/flights/search", get(search_flights))
}

/// GET /flights/search?page=&items=
/// Merged results from every provider, sorted by agony, optionally paginated
async fn search_flights(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchPage>, AppError> {
    let spec = PageSpec::from_query(params.page.as_deref(), params.items.as_deref())?;

    let page = state.search.search(spec).await?;

    info!(
        ?spec,
        returned = page.results().len(),
        total = page.total(),
        cache_hit = page.cache_hit,
        "flight search served"
    );
    Ok(Json(page))
}
