//! Edit sessions: scoped change transactions against one application.
//!
//! An [`EditSession`] is consumed by [`EditSession::commit`] or
//! [`EditSession::discard`], so no operation can reference a session after it
//! has been closed. Dropping a session that was neither committed nor
//! discarded leaves the edit open on the remote and logs a warning.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{AppEdit, CommitResult};
use crate::publisher::Publisher;

pub struct EditSession<'p> {
    publisher: &'p dyn Publisher,
    app_id: String,
    edit: AppEdit,
    closed: bool,
}

impl<'p> EditSession<'p> {
    /// Open a new edit on `app_id`.
    pub async fn open(publisher: &'p dyn Publisher, app_id: &str) -> Result<Self> {
        let edit = publisher.open_edit(app_id).await?;
        let session = Self::attach(publisher, app_id, edit);
        match session.expires_at() {
            Some(expiry) => tracing::info!(
                "Opened edit {} on {} (expires {})",
                session.id(),
                app_id,
                expiry.to_rfc3339()
            ),
            None => tracing::info!("Opened edit {} on {}", session.id(), app_id),
        }
        Ok(session)
    }

    /// Wrap an edit that was opened elsewhere.
    pub fn attach(publisher: &'p dyn Publisher, app_id: &str, edit: AppEdit) -> Self {
        Self {
            publisher,
            app_id: app_id.to_string(),
            edit,
            closed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.edit.id
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// When the remote will consider this edit stale, if it said.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.edit
            .expiry_time_seconds
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub(crate) fn publisher(&self) -> &'p dyn Publisher {
        self.publisher
    }

    /// Atomically apply every staged change.
    ///
    /// On failure the edit is deleted (best effort) since the remote will not
    /// accept it again.
    pub async fn commit(mut self) -> Result<CommitResult> {
        self.closed = true;
        match self.publisher.commit_edit(&self.app_id, &self.edit.id).await {
            Ok(result) => {
                tracing::info!("Committed edit {} on {}", self.edit.id, self.app_id);
                Ok(result)
            }
            Err(e) => {
                let cleanup = self.publisher.delete_edit(&self.app_id, &self.edit.id).await;
                if let Err(cleanup) = cleanup {
                    tracing::debug!("Could not delete failed edit {}: {}", self.edit.id, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Release the edit without applying staged changes.
    pub async fn discard(mut self) -> Result<()> {
        self.closed = true;
        self.publisher.delete_edit(&self.app_id, &self.edit.id).await?;
        tracing::debug!("Discarded edit {} on {}", self.edit.id, self.app_id);
        Ok(())
    }
}

impl Drop for EditSession<'_> {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!(
                "Edit {} on {} dropped without commit or discard",
                self.edit.id,
                self.app_id
            );
        }
    }
}
