use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use futures::StreamExt;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use parlex_pipeline::{run_topic_search, Orchestrator};
use parlex_search::SearchAggregator;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<SearchAggregator>,
    pub orchestrator: Arc<Orchestrator>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/parlex/topic-search", post(topic_search))
        .route("/health", get(health))
        .route("/info", get(info))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct TopicSearchParams {
    pub user_query: String,
    pub num_contributions: usize,
    /// Inclusive month range, expanded server-side to calendar days.
    pub month_range: [NaiveDate; 2],
}

/// Streams newline-delimited JSON frames: one summary frame as soon as the
/// member grouping is known, then one contribution frame per completed
/// member in completion order. A search backend failure aborts the body.
async fn topic_search(
    State(state): State<AppState>,
    Json(params): Json<TopicSearchParams>,
) -> impl IntoResponse {
    tracing::info!(
        query = %params.user_query,
        num_contributions = params.num_contributions,
        "Topic search request"
    );

    let frames = run_topic_search(
        state.aggregator,
        state.orchestrator,
        params.user_query,
        (params.month_range[0], params.month_range[1]),
        params.num_contributions,
    );

    let body = Body::from_stream(frames.map(|frame| {
        frame
            .and_then(|f| f.to_ndjson())
            .map_err(|e| -> axum::BoxError { e.into() })
    }));

    ([(header::CONTENT_TYPE, "application/json")], body)
}

async fn health() -> &'static str {
    "ok"
}

async fn info() -> impl IntoResponse {
    Json(serde_json::json!({ "backend": "parlex-server" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_search_params_parse() {
        let raw = serde_json::json!({
            "user_query": "carbon border tax",
            "num_contributions": 50,
            "month_range": ["2025-01-01", "2025-06-01"],
        });
        let params: TopicSearchParams = serde_json::from_value(raw).unwrap();
        assert_eq!(params.user_query, "carbon border tax");
        assert_eq!(params.num_contributions, 50);
        assert_eq!(
            params.month_range[0],
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
    }
}
