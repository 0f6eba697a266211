//! HTTP API for the card catalog
//!
//! Serves the browse/search endpoints consumed by the static client.
//! Handlers validate query parameters, delegate to the repositories and
//! map absence to 404 and invalid input to 400, both with an `{error}`
//! body. Store failures are logged with request context and surface
//! as 500.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Json},
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use crate::artists::{find_artist_by_id, paginated_artists, search_artists_by_name};
use crate::cards::{find_card_by_uuid, paginated_cards, search_cards_by_name, set_codes};
use crate::models::{ArtistDto, CardDto, SetCodeCount};
use crate::pagination::Page;

/// Shared application state (thread-safe database connection)
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
}

/// Structured error body for 4xx/5xx responses
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn error_response(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

fn internal_error() -> ApiError {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// List query parameters
#[derive(Deserialize)]
struct ListParams {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(rename = "setCode")]
    set_code: Option<String>,
}

/// Search query parameters
#[derive(Deserialize)]
struct SearchParams {
    query: Option<String>,
    #[serde(default = "default_page")]
    page: i64,
    #[serde(rename = "setCode")]
    set_code: Option<String>,
}

fn default_page() -> i64 {
    1
}

/// Floor the requested page at 1 (repositories clamp the upper end)
fn floor_page(page: i64) -> u64 {
    page.max(1) as u64
}

/// Reject queries shorter than 3 bytes before they reach the store layer
///
/// Both search endpoints fail hard with a 400 error body; the card
/// client wrapper turns that into an empty envelope on its side.
fn validate_query(query: Option<&str>) -> Result<&str, ApiError> {
    match query {
        Some(q) if q.len() >= 3 => Ok(q),
        other => {
            log::warn!(
                "Invalid search query: query={:?} length={}",
                other,
                other.map_or(0, str::len)
            );
            Err(error_response(
                StatusCode::BAD_REQUEST,
                "Search query must be at least 3 characters long",
            ))
        }
    }
}

/// GET / - Serve the web client (single HTML page)
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// GET /api/artist/all?page=
async fn artist_all_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<ArtistDto>>, ApiError> {
    let page = floor_page(params.page);
    let conn = state.db.lock().unwrap();

    match paginated_artists(&conn, page) {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            log::error!("Failed to retrieve artists: page={} error={}", page, e);
            Err(internal_error())
        }
    }
}

/// GET /api/artist/search?query=&page=
async fn artist_search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Page<ArtistDto>>, ApiError> {
    let query = validate_query(params.query.as_deref())?;
    let page = floor_page(params.page);
    let conn = state.db.lock().unwrap();

    match search_artists_by_name(&conn, query, page) {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            log::error!(
                "Artist search failed: query={} page={} error={}",
                query,
                page,
                e
            );
            Err(internal_error())
        }
    }
}

/// GET /api/artist/{id}
async fn artist_show_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ArtistDto>, ApiError> {
    log::debug!("Fetching artist by ID: id={}", id);
    let conn = state.db.lock().unwrap();

    match find_artist_by_id(&conn, id) {
        Ok(Some(artist)) => Ok(Json(artist)),
        Ok(None) => {
            log::info!("Artist not found: id={}", id);
            Err(error_response(StatusCode::NOT_FOUND, "Artist not found"))
        }
        Err(e) => {
            log::error!("Failed to retrieve artist: id={} error={}", id, e);
            Err(internal_error())
        }
    }
}

/// GET /api/card/all?page=&setCode=
async fn card_all_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<CardDto>>, ApiError> {
    let page = floor_page(params.page);
    let conn = state.db.lock().unwrap();

    match paginated_cards(&conn, page, params.set_code.as_deref()) {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            log::error!(
                "Failed to retrieve cards: page={} set_code={:?} error={}",
                page,
                params.set_code,
                e
            );
            Err(internal_error())
        }
    }
}

/// GET /api/card/search?query=&setCode=&page=
async fn card_search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Page<CardDto>>, ApiError> {
    let query = validate_query(params.query.as_deref())?;
    let page = floor_page(params.page);
    let conn = state.db.lock().unwrap();

    match search_cards_by_name(&conn, query, params.set_code.as_deref(), page) {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            log::error!(
                "Card search failed: query={} set_code={:?} page={} error={}",
                query,
                params.set_code,
                page,
                e
            );
            Err(internal_error())
        }
    }
}

/// GET /api/card/set-codes
async fn set_codes_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<SetCodeCount>>, ApiError> {
    let conn = state.db.lock().unwrap();

    match set_codes(&conn) {
        Ok(codes) => Ok(Json(codes)),
        Err(e) => {
            log::error!("Failed to retrieve set codes: error={}", e);
            Err(internal_error())
        }
    }
}

/// GET /api/card/{uuid}
async fn card_show_handler(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<CardDto>, ApiError> {
    log::debug!("Fetching card by UUID: uuid={}", uuid);
    let conn = state.db.lock().unwrap();

    match find_card_by_uuid(&conn, &uuid) {
        Ok(Some(card)) => Ok(Json(card)),
        Ok(None) => {
            log::info!("Card not found: uuid={}", uuid);
            Err(error_response(StatusCode::NOT_FOUND, "Card not found"))
        }
        Err(e) => {
            log::error!("Failed to retrieve card: uuid={} error={}", uuid, e);
            Err(internal_error())
        }
    }
}

/// Build the API router
pub fn create_router(db: Arc<Mutex<Connection>>) -> Router {
    let state = AppState { db };

    Router::new()
        .route("/", get(index_handler))
        .route("/api/artist/all", get(artist_all_handler))
        .route("/api/artist/search", get(artist_search_handler))
        .route("/api/artist/{id}", get(artist_show_handler))
        .route("/api/card/all", get(card_all_handler))
        .route("/api/card/search", get(card_search_handler))
        .route("/api/card/set-codes", get(set_codes_handler))
        .route("/api/card/{uuid}", get(card_show_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web server (async)
///
/// Binds to 0.0.0.0 (all interfaces) to work with Docker port mapping.
/// Use firewall rules or port mapping to control external exposure.
pub async fn serve(
    db: Arc<Mutex<Connection>>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(db);
    let addr = format!("0.0.0.0:{}", port);

    log::info!("Card catalog API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
