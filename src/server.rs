//! HTTP surface: `/`, `/search` and `/search_all`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use di_search::{build_cards, CollectionRun, Collector};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::AgentConfig;
use crate::error::Result;
use crate::keepalive::KeepAlive;
use crate::present::{render_html, Format, SearchPayload};

#[derive(Clone)]
struct AppState {
    collector: Collector,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    format: Format,
    /// Attach enriched supplier cards to a JSON response.
    #[serde(default)]
    cards: bool,
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    /// Full registry only.
    Full,
    /// Full registry, then the fallback subset if that was empty.
    WithFallback,
}

/// Build the service router around a ready collector.
pub fn router(collector: Collector) -> Router {
    Router::new()
        .route("/", get(info))
        .route("/search", get(search))
        .route("/search_all", get(search_all))
        .with_state(AppState { collector })
}

/// Bind, start the optional keep-alive pinger and serve until `cancel` fires.
///
/// # Errors
///
/// Returns an error if the collector cannot be built from the config or the
/// listener cannot be bound.
pub async fn serve(config: AgentConfig, cancel: CancellationToken) -> Result<()> {
    let collector = Collector::new(config.collect.clone())?;
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    let local_addr = listener.local_addr()?;

    if let Some(pinger) = KeepAlive::from_config(&config.keepalive, cancel.child_token())? {
        tokio::spawn(pinger.run());
    }

    tracing::info!(
        sources = collector.registry().len(),
        "di-agent listening on http://{local_addr}"
    );
    let shutdown = cancel.clone();
    axum::serve(listener, router(collector))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    tracing::info!("di-agent stopped");
    Ok(())
}

async fn info(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "di-agent",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
        "sources": state.collector.registry().len(),
        "endpoints": ["/search?q=", "/search_all?q="],
    }))
}

async fn search(State(state): State<AppState>, Query(params): Query<SearchQuery>) -> Response {
    respond(&state, params, Mode::WithFallback).await
}

async fn search_all(State(state): State<AppState>, Query(params): Query<SearchQuery>) -> Response {
    respond(&state, params, Mode::Full).await
}

async fn respond(state: &AppState, params: SearchQuery, mode: Mode) -> Response {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "status": "error",
                "error": "query parameter q is required",
            })),
        )
            .into_response();
    }

    let collector = &state.collector;
    let run: CollectionRun = match mode {
        Mode::Full => collector.collect(query).await,
        Mode::WithFallback => collector.collect_with_fallback(query).await,
    };

    match params.format {
        Format::Html => {
            let cards = build_cards(collector, &run.results).await;
            Html(render_html(query, &run, &cards)).into_response()
        }
        Format::Json => {
            let cards = if params.cards {
                Some(build_cards(collector, &run.results).await)
            } else {
                None
            };
            Json(SearchPayload::new(query, &run, cards.as_deref())).into_response()
        }
    }
}
