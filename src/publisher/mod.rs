//! The remote publishing service, as consumed by the workflows.
//!
//! [`Publisher`] is the seam between the edit/track state machine and the
//! service that stores it. Two implementations exist:
//! - [`PlayClient`]: HTTP client for the real service
//! - [`InMemoryPublisher`]: process-local service for tests

mod http;
mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AppEdit, BundleRef, Release, Track};

pub use http::PlayClient;
pub use memory::InMemoryPublisher;

/// Operations of the publishing service's edits resource.
///
/// Every call is a single request; callers await each before issuing the next.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Open a new edit on an application.
    async fn open_edit(&self, app_id: &str) -> Result<AppEdit>;

    /// List the bundles uploaded within an edit.
    async fn list_bundles(&self, app_id: &str, edit_id: &str) -> Result<Vec<BundleRef>>;

    /// Read a track as seen within an edit.
    async fn get_track(&self, app_id: &str, edit_id: &str, track: &str) -> Result<Track>;

    /// Replace the releases of a track within an edit.
    async fn update_track(
        &self,
        app_id: &str,
        edit_id: &str,
        track: &str,
        releases: &[Release],
    ) -> Result<Track>;

    /// Atomically apply every change staged in an edit.
    async fn commit_edit(&self, app_id: &str, edit_id: &str) -> Result<AppEdit>;

    /// Delete an edit without applying its staged changes.
    async fn delete_edit(&self, app_id: &str, edit_id: &str) -> Result<()>;
}
