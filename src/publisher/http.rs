//! HTTP client for the publishing service's edits resource.
//!
//! Paths are relative to the applications resource
//! ([`crate::config::DEFAULT_API_URL`] in production).

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::Publisher;
use crate::error::{Error, Result};
use crate::models::*;

/// Which resource a request addressed, so failures map onto the right error.
#[derive(Debug, Clone, Copy)]
enum Resource<'a> {
    Edit,
    Track(&'a str),
    Commit,
}

/// HTTP client for the publishing service.
#[derive(Debug, Clone)]
pub struct PlayClient {
    base_url: String,
    access_token: Option<String>,
    client: Client,
}

impl PlayClient {
    /// Create with explicit configuration.
    pub fn new(base_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `segments` under the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Server(format!("invalid API URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Server(format!("API URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build a request with optional auth header.
    fn request(&self, method: Method, segments: &[&str]) -> Result<reqwest::RequestBuilder> {
        let mut req = self.client.request(method, self.endpoint(segments)?);
        if let Some(ref token) = self.access_token {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    /// Handle response, converting HTTP errors to [`Error`].
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: Resource<'_>,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(map_status(status, body, resource))
        }
    }

    /// Handle response that may return an empty body.
    async fn handle_empty_response(
        &self,
        response: reqwest::Response,
        resource: Resource<'_>,
    ) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(map_status(status, body, resource))
        }
    }
}

fn map_status(status: StatusCode, body: String, resource: Resource<'_>) -> Error {
    match (status, resource) {
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, Resource::Edit) => {
            Error::Session(format!("credentials rejected ({}): {}", status, body))
        }
        (StatusCode::UNAUTHORIZED, _) => Error::Unauthorized(body),
        (StatusCode::NOT_FOUND, Resource::Track(track)) => Error::TrackNotFound(track.to_string()),
        (
            StatusCode::BAD_REQUEST
            | StatusCode::NOT_FOUND
            | StatusCode::CONFLICT
            | StatusCode::PRECONDITION_FAILED,
            Resource::Edit | Resource::Commit,
        ) => Error::Session(format!("{}: {}", status, body)),
        _ => Error::Server(format!("{}: {}", status, body)),
    }
}

#[async_trait]
impl Publisher for PlayClient {
    async fn open_edit(&self, app_id: &str) -> Result<AppEdit> {
        let response = self
            .request(Method::POST, &[app_id, "edits"])?
            .json(&serde_json::json!({}))
            .send()
            .await?;
        self.handle_response(response, Resource::Edit).await
    }

    async fn list_bundles(&self, app_id: &str, edit_id: &str) -> Result<Vec<BundleRef>> {
        let response = self
            .request(Method::GET, &[app_id, "edits", edit_id, "bundles"])?
            .send()
            .await?;
        let listing: BundlesListResponse = self.handle_response(response, Resource::Edit).await?;
        Ok(listing.bundles)
    }

    async fn get_track(&self, app_id: &str, edit_id: &str, track: &str) -> Result<Track> {
        let response = self
            .request(Method::GET, &[app_id, "edits", edit_id, "tracks", track])?
            .send()
            .await?;
        self.handle_response(response, Resource::Track(track)).await
    }

    async fn update_track(
        &self,
        app_id: &str,
        edit_id: &str,
        track: &str,
        releases: &[Release],
    ) -> Result<Track> {
        let response = self
            .request(Method::PUT, &[app_id, "edits", edit_id, "tracks", track])?
            .json(&serde_json::json!({
                "track": track,
                "releases": releases
            }))
            .send()
            .await?;
        self.handle_response(response, Resource::Track(track)).await
    }

    async fn commit_edit(&self, app_id: &str, edit_id: &str) -> Result<AppEdit> {
        let action = format!("{}:commit", edit_id);
        let response = self
            .request(Method::POST, &[app_id, "edits", action.as_str()])?
            .send()
            .await?;
        self.handle_response(response, Resource::Commit).await
    }

    async fn delete_edit(&self, app_id: &str, edit_id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, &[app_id, "edits", edit_id])?
            .send()
            .await?;
        self.handle_empty_response(response, Resource::Edit).await
    }
}
