//! Process-local publishing service.
//!
//! Mirrors the remote's transactional behavior: each edit works on a private
//! snapshot of the application's tracks, a commit replaces the application's
//! tracks with that snapshot, and a commit is rejected when the edit expired
//! or another edit was committed on the same application after it was opened.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Publisher;
use crate::error::{Error, Result};
use crate::models::*;

const DEFAULT_EDIT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Clone)]
pub struct InMemoryPublisher {
    state: Arc<Mutex<State>>,
}

struct State {
    apps: HashMap<String, AppState>,
    edits: HashMap<String, EditState>,
    edit_ttl: chrono::Duration,
    commits: usize,
}

#[derive(Default)]
struct AppState {
    /// Bumped on every commit; edits opened before a bump can no longer commit.
    revision: u64,
    tracks: BTreeMap<String, Vec<Release>>,
    bundles: Vec<BundleRef>,
}

struct EditState {
    app_id: String,
    base_revision: u64,
    tracks: BTreeMap<String, Vec<Release>>,
    bundles: Vec<BundleRef>,
    expires_at: DateTime<Utc>,
}

impl Default for InMemoryPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::with_edit_ttl(DEFAULT_EDIT_TTL)
    }

    /// Create a service whose edits go stale `ttl` after they are opened.
    pub fn with_edit_ttl(ttl: Duration) -> Self {
        let edit_ttl =
            chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365));
        Self {
            state: Arc::new(Mutex::new(State {
                apps: HashMap::new(),
                edits: HashMap::new(),
                edit_ttl,
                commits: 0,
            })),
        }
    }

    // ============================================================
    // Seeding
    // ============================================================

    /// Register an application with no tracks.
    pub fn add_app(&self, app_id: &str) {
        let mut state = self.state.lock().expect("publisher lock poisoned");
        state.apps.entry(app_id.to_string()).or_default();
    }

    /// Set the committed releases of a track, registering the app if needed.
    pub fn set_track(&self, app_id: &str, track: &str, releases: Vec<Release>) {
        let mut state = self.state.lock().expect("publisher lock poisoned");
        let app = state.apps.entry(app_id.to_string()).or_default();
        app.tracks.insert(track.to_string(), releases);
    }

    /// Record an uploaded bundle; edits opened afterwards will list it.
    pub fn upload_bundle(&self, app_id: &str, bundle: BundleRef) {
        let mut state = self.state.lock().expect("publisher lock poisoned");
        let app = state.apps.entry(app_id.to_string()).or_default();
        app.bundles.push(bundle);
    }

    // ============================================================
    // Inspection
    // ============================================================

    /// The committed state of a track, outside any edit.
    pub fn committed_track(&self, app_id: &str, track: &str) -> Option<Track> {
        let state = self.state.lock().expect("publisher lock poisoned");
        state
            .apps
            .get(app_id)
            .and_then(|app| app.tracks.get(track))
            .map(|releases| Track::new(track, releases.clone()))
    }

    /// Number of successful commits across all applications.
    pub fn commit_count(&self) -> usize {
        self.state.lock().expect("publisher lock poisoned").commits
    }

    /// Number of edits that are neither committed nor deleted.
    pub fn open_edit_count(&self) -> usize {
        self.state.lock().expect("publisher lock poisoned").edits.len()
    }
}

impl State {
    /// Look up an edit that belongs to `app_id` and has not expired.
    fn live_edit(&mut self, app_id: &str, edit_id: &str) -> Result<&mut EditState> {
        let edit = self
            .edits
            .get_mut(edit_id)
            .filter(|edit| edit.app_id == app_id)
            .ok_or_else(|| Error::Session(format!("edit {} does not exist", edit_id)))?;
        if Utc::now() >= edit.expires_at {
            return Err(Error::Session(format!("edit {} has expired", edit_id)));
        }
        Ok(edit)
    }
}

#[async_trait]
impl Publisher for InMemoryPublisher {
    async fn open_edit(&self, app_id: &str) -> Result<AppEdit> {
        let mut state = self.state.lock().expect("publisher lock poisoned");
        let app = state
            .apps
            .get(app_id)
            .ok_or_else(|| Error::Session(format!("application {} not found", app_id)))?;

        let id = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + state.edit_ttl;
        let edit = EditState {
            app_id: app_id.to_string(),
            base_revision: app.revision,
            tracks: app.tracks.clone(),
            bundles: app.bundles.clone(),
            expires_at,
        };
        state.edits.insert(id.clone(), edit);

        Ok(AppEdit {
            id,
            expiry_time_seconds: Some(expires_at.timestamp().to_string()),
        })
    }

    async fn list_bundles(&self, app_id: &str, edit_id: &str) -> Result<Vec<BundleRef>> {
        let mut state = self.state.lock().expect("publisher lock poisoned");
        Ok(state.live_edit(app_id, edit_id)?.bundles.clone())
    }

    async fn get_track(&self, app_id: &str, edit_id: &str, track: &str) -> Result<Track> {
        let mut state = self.state.lock().expect("publisher lock poisoned");
        let edit = state.live_edit(app_id, edit_id)?;
        edit.tracks
            .get(track)
            .map(|releases| Track::new(track, releases.clone()))
            .ok_or_else(|| Error::TrackNotFound(track.to_string()))
    }

    async fn update_track(
        &self,
        app_id: &str,
        edit_id: &str,
        track: &str,
        releases: &[Release],
    ) -> Result<Track> {
        let mut state = self.state.lock().expect("publisher lock poisoned");
        let edit = state.live_edit(app_id, edit_id)?;
        let staged = edit
            .tracks
            .get_mut(track)
            .ok_or_else(|| Error::TrackNotFound(track.to_string()))?;
        *staged = releases.to_vec();
        Ok(Track::new(track, staged.clone()))
    }

    async fn commit_edit(&self, app_id: &str, edit_id: &str) -> Result<AppEdit> {
        let mut state = self.state.lock().expect("publisher lock poisoned");
        state.live_edit(app_id, edit_id)?;
        let edit = state
            .edits
            .remove(edit_id)
            .ok_or_else(|| Error::Session(format!("edit {} does not exist", edit_id)))?;

        let app = state
            .apps
            .get_mut(app_id)
            .ok_or_else(|| Error::Session(format!("application {} not found", app_id)))?;
        if app.revision != edit.base_revision {
            return Err(Error::Session(format!(
                "edit {} conflicts with a more recent commit",
                edit_id
            )));
        }
        app.tracks = edit.tracks;
        app.revision += 1;
        state.commits += 1;

        Ok(AppEdit {
            id: edit_id.to_string(),
            expiry_time_seconds: None,
        })
    }

    async fn delete_edit(&self, app_id: &str, edit_id: &str) -> Result<()> {
        let mut state = self.state.lock().expect("publisher lock poisoned");
        let owned = state
            .edits
            .get(edit_id)
            .is_some_and(|edit| edit.app_id == app_id);
        if !owned {
            return Err(Error::Session(format!("edit {} does not exist", edit_id)));
        }
        state.edits.remove(edit_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP: &str = "com.example.app";

    fn seeded() -> InMemoryPublisher {
        let publisher = InMemoryPublisher::new();
        publisher.set_track(
            APP,
            "internal",
            vec![Release::new(vec![1], ReleaseStatus::Draft)],
        );
        publisher
    }

    #[tokio::test]
    async fn staged_changes_are_invisible_until_commit() {
        let publisher = seeded();
        let edit = publisher.open_edit(APP).await.unwrap();
        let completed = vec![Release::new(vec![1], ReleaseStatus::Completed)];

        publisher
            .update_track(APP, &edit.id, "internal", &completed)
            .await
            .unwrap();
        assert_eq!(
            publisher.committed_track(APP, "internal").unwrap().releases[0].status,
            ReleaseStatus::Draft
        );

        publisher.commit_edit(APP, &edit.id).await.unwrap();
        assert_eq!(
            publisher.committed_track(APP, "internal").unwrap().releases,
            completed
        );
    }

    #[tokio::test]
    async fn second_commit_of_same_edit_fails() {
        let publisher = seeded();
        let edit = publisher.open_edit(APP).await.unwrap();

        publisher.commit_edit(APP, &edit.id).await.unwrap();
        let again = publisher.commit_edit(APP, &edit.id).await;

        assert!(matches!(again, Err(Error::Session(_))));
        assert_eq!(publisher.commit_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_edit_commit_conflicts() {
        let publisher = seeded();
        let first = publisher.open_edit(APP).await.unwrap();
        let second = publisher.open_edit(APP).await.unwrap();

        publisher.commit_edit(APP, &first.id).await.unwrap();
        let result = publisher.commit_edit(APP, &second.id).await;

        assert!(matches!(result, Err(Error::Session(msg)) if msg.contains("conflicts")));
    }

    #[tokio::test]
    async fn expired_edit_cannot_commit() {
        let publisher = InMemoryPublisher::with_edit_ttl(Duration::ZERO);
        publisher.add_app(APP);
        let edit = publisher.open_edit(APP).await.unwrap();

        let result = publisher.commit_edit(APP, &edit.id).await;

        assert!(matches!(result, Err(Error::Session(msg)) if msg.contains("expired")));
    }

    #[tokio::test]
    async fn unknown_app_cannot_open_edit() {
        let publisher = InMemoryPublisher::new();
        let result = publisher.open_edit("com.unknown").await;
        assert!(matches!(result, Err(Error::Session(_))));
    }

    #[tokio::test]
    async fn unknown_track_is_reported() {
        let publisher = seeded();
        let edit = publisher.open_edit(APP).await.unwrap();
        let result = publisher.get_track(APP, &edit.id, "production").await;
        assert!(matches!(result, Err(Error::TrackNotFound(t)) if t == "production"));
    }

    #[tokio::test]
    async fn deleted_edit_is_gone() {
        let publisher = seeded();
        let edit = publisher.open_edit(APP).await.unwrap();
        assert_eq!(publisher.open_edit_count(), 1);

        publisher.delete_edit(APP, &edit.id).await.unwrap();

        assert_eq!(publisher.open_edit_count(), 0);
        assert!(publisher.list_bundles(APP, &edit.id).await.is_err());
    }
}
