//! Site info API endpoints

use axum::{extract::State, routing::get, Json, Router};

use crate::api::middleware::{ApiError, AppState};
use crate::services::SiteOverview;

/// Build the site router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_overview))
}

/// GET /api/v1/site - owner profile and content statistics
async fn get_overview(State(state): State<AppState>) -> Result<Json<SiteOverview>, ApiError> {
    let overview = state.site_service.get_overview().await?;
    Ok(Json(overview))
}
