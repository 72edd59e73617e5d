use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{RawQuery, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tracing::info;

use crate::report::{DirectoryReport, RankingsReport};
use crate::scraper::{self, Fetch};
use crate::settings::Settings;
use crate::sources;

/// Shared across requests; every request still builds its own merge state.
pub struct AppState {
    pub settings: Settings,
    pub fetcher: Arc<dyn Fetch>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/directory", get(directory))
        .route("/api/rankings", get(rankings))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let addr = format!("{}:{}", state.settings.host, state.settings.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Server running on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Run the directory aggregation; shared by the handler and the CLI.
pub async fn directory_report(state: &AppState) -> DirectoryReport {
    let source = state.settings.directory_source().source();
    let agg = scraper::aggregate(
        state.fetcher.as_ref(),
        std::slice::from_ref(&source),
        state.settings.concurrency,
    )
    .await;
    DirectoryReport::new(&source.url, agg)
}

/// Run the ranking aggregation for `year` (or the configured default).
pub async fn rankings_report(state: &AppState, year: Option<&str>) -> RankingsReport {
    let year = sources::resolve_year(year, &state.settings.default_year);
    let list = state.settings.ranking_sources().for_year(&year);
    let agg = scraper::aggregate(state.fetcher.as_ref(), &list, state.settings.concurrency).await;
    RankingsReport::new(&year, agg)
}

async fn directory(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = directory_report(&state).await;
    ([(header::CACHE_CONTROL, "no-store")], Json(report))
}

/// First `year` in the query string; repeats and malformed pairs never reject.
fn year_param(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "year")
        .map(|(_, value)| value.into_owned())
}

async fn rankings(State(state): State<Arc<AppState>>, RawQuery(query): RawQuery) -> impl IntoResponse {
    let year = year_param(query.as_deref());
    let report = rankings_report(&state, year.as_deref()).await;
    ([(header::CACHE_CONTROL, "no-store")], Json(report))
}
