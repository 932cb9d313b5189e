//! In-process fake of the publishing service's HTTP API, backed by
//! [`InMemoryPublisher`], for driving [`PlayClient`] end to end.

#![allow(dead_code)]

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use playtrack::models::*;
use playtrack::publisher::{InMemoryPublisher, PlayClient, Publisher};
use playtrack::Error;

pub const APP: &str = "com.example.app";
pub const TOKEN: &str = "test-token";

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn api_error(e: Error) -> (StatusCode, String) {
    let status = match e {
        Error::Session(_) => StatusCode::BAD_REQUEST,
        Error::TrackNotFound(_) => StatusCode::NOT_FOUND,
        Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

async fn require_token(req: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", TOKEN);
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
    }
    next.run(req).await
}

async fn open_edit(
    State(publisher): State<InMemoryPublisher>,
    Path(app): Path<String>,
) -> ApiResult<AppEdit> {
    publisher.open_edit(&app).await.map(Json).map_err(api_error)
}

async fn list_bundles(
    State(publisher): State<InMemoryPublisher>,
    Path((app, edit)): Path<(String, String)>,
) -> ApiResult<BundlesListResponse> {
    publisher
        .list_bundles(&app, &edit)
        .await
        .map(|bundles| Json(BundlesListResponse { bundles }))
        .map_err(api_error)
}

async fn get_track(
    State(publisher): State<InMemoryPublisher>,
    Path((app, edit, track)): Path<(String, String, String)>,
) -> ApiResult<Track> {
    publisher
        .get_track(&app, &edit, &track)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn update_track(
    State(publisher): State<InMemoryPublisher>,
    Path((app, edit, track)): Path<(String, String, String)>,
    Json(body): Json<Track>,
) -> ApiResult<Track> {
    publisher
        .update_track(&app, &edit, &track, &body.releases)
        .await
        .map(Json)
        .map_err(api_error)
}

/// `POST {app}/edits/{id}:commit`
async fn commit_edit(
    State(publisher): State<InMemoryPublisher>,
    Path((app, edit)): Path<(String, String)>,
) -> ApiResult<AppEdit> {
    let Some(id) = edit.strip_suffix(":commit") else {
        return Err((StatusCode::NOT_FOUND, format!("Unknown action on {}", edit)));
    };
    publisher
        .commit_edit(&app, id)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn delete_edit(
    State(publisher): State<InMemoryPublisher>,
    Path((app, edit)): Path<(String, String)>,
) -> Result<StatusCode, (StatusCode, String)> {
    publisher
        .delete_edit(&app, &edit)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(api_error)
}

pub fn router(publisher: InMemoryPublisher) -> Router {
    Router::new()
        .route("/{app}/edits", post(open_edit))
        .route("/{app}/edits/{edit}", post(commit_edit).delete(delete_edit))
        .route("/{app}/edits/{edit}/bundles", get(list_bundles))
        .route(
            "/{app}/edits/{edit}/tracks/{track}",
            get(get_track).put(update_track),
        )
        .layer(middleware::from_fn(require_token))
        .with_state(publisher)
}

/// Serve the fake API on an ephemeral port and return its base URL.
pub async fn spawn(publisher: InMemoryPublisher) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    tokio::spawn(async move {
        axum::serve(listener, router(publisher))
            .await
            .expect("Fake API stopped");
    });
    format!("http://{}", addr)
}

/// Spawn the fake API and return an authorized client for it.
pub async fn client_for(publisher: &InMemoryPublisher) -> PlayClient {
    let base_url = spawn(publisher.clone()).await;
    PlayClient::new(base_url, Some(TOKEN.to_string()))
}

pub fn draft(codes: &[i64]) -> Release {
    Release::new(codes.to_vec(), ReleaseStatus::Draft)
}

pub fn completed(codes: &[i64]) -> Release {
    Release::new(codes.to_vec(), ReleaseStatus::Completed)
}
