//! The three promotion flows.
//!
//! Each flow opens exactly one edit and closes it on every path: the edit is
//! committed when the flow changes something, and discarded otherwise. Errors
//! from the steps are logged here and end the flow in `Failed`; changes the
//! remote already accepted are not rolled back.

use std::fmt;

use crate::error::Error;
use crate::models::{CommitResult, Release, ReleaseStatus};
use crate::promotion::promote;
use crate::publisher::Publisher;
use crate::selector;
use crate::session::EditSession;
use crate::track::{list_bundles_uploaded, list_releases};

/// Terminal state of [`publish_if_staged`].
#[derive(Debug)]
pub enum PublishOutcome {
    Published(CommitResult),
    NothingToPublish,
    Failed(Error),
}

/// Terminal state of [`inspect_completed`].
#[derive(Debug)]
pub enum InspectOutcome {
    Inspected { track: String, releases: Vec<Release> },
    Failed(Error),
}

/// Terminal state of [`promote_latest_draft`].
#[derive(Debug)]
pub enum PromoteOutcome {
    Promoted {
        release: Release,
        commit: CommitResult,
    },
    NothingToPromote,
    Failed(Error),
}

// ============================================================
// Flows
// ============================================================

/// Commit the edit if bundles were uploaded and `track` holds a draft.
pub async fn publish_if_staged(
    publisher: &dyn Publisher,
    app_id: &str,
    track: &str,
) -> PublishOutcome {
    if let Err(e) = check_target(app_id, track) {
        return PublishOutcome::Failed(failed("publish", e));
    }
    let session = match EditSession::open(publisher, app_id).await {
        Ok(session) => session,
        Err(e) => return PublishOutcome::Failed(failed("publish", e)),
    };

    match has_staged_draft(&session, track).await {
        Ok(true) => match session.commit().await {
            Ok(commit) => PublishOutcome::Published(commit),
            Err(e) => PublishOutcome::Failed(failed("publish", e)),
        },
        Ok(false) => {
            close(session).await;
            PublishOutcome::NothingToPublish
        }
        Err(e) => {
            close(session).await;
            PublishOutcome::Failed(failed("publish", e))
        }
    }
}

/// List the completed releases on `track` without changing anything.
pub async fn inspect_completed(
    publisher: &dyn Publisher,
    app_id: &str,
    track: &str,
) -> InspectOutcome {
    if let Err(e) = check_target(app_id, track) {
        return InspectOutcome::Failed(failed("inspect", e));
    }
    let session = match EditSession::open(publisher, app_id).await {
        Ok(session) => session,
        Err(e) => return InspectOutcome::Failed(failed("inspect", e)),
    };

    let outcome = match list_releases(&session, track).await {
        Ok(releases) => InspectOutcome::Inspected {
            track: track.to_string(),
            releases: selector::completed(&releases)
                .into_iter()
                .cloned()
                .collect(),
        },
        Err(e) => InspectOutcome::Failed(failed("inspect", e)),
    };
    close(session).await;
    outcome
}

/// Move the latest draft on `track` to completed and commit.
pub async fn promote_latest_draft(
    publisher: &dyn Publisher,
    app_id: &str,
    track: &str,
) -> PromoteOutcome {
    if let Err(e) = check_target(app_id, track) {
        return PromoteOutcome::Failed(failed("promote", e));
    }
    let session = match EditSession::open(publisher, app_id).await {
        Ok(session) => session,
        Err(e) => return PromoteOutcome::Failed(failed("promote", e)),
    };

    let candidate = match list_releases(&session, track).await {
        Ok(releases) => selector::latest_draft(&releases).cloned(),
        Err(e) => {
            close(session).await;
            return PromoteOutcome::Failed(failed("promote", e));
        }
    };

    let Some(release) = candidate else {
        tracing::info!("No draft release on '{}'", track);
        close(session).await;
        return PromoteOutcome::NothingToPromote;
    };

    let Some(version_code) = release.leading_version_code() else {
        close(session).await;
        return PromoteOutcome::Failed(failed(
            "promote",
            Error::Server(format!("draft release on '{}' has no version codes", track)),
        ));
    };

    tracing::info!("Latest draft on '{}' is {}", track, release.label());
    if let Err(e) = promote(&session, track, version_code, ReleaseStatus::Completed).await {
        close(session).await;
        return PromoteOutcome::Failed(failed("promote", e));
    }

    match session.commit().await {
        Ok(commit) => PromoteOutcome::Promoted {
            release: Release {
                status: ReleaseStatus::Completed,
                ..release
            },
            commit,
        },
        Err(e) => PromoteOutcome::Failed(failed("promote", e)),
    }
}

// ============================================================
// Helpers
// ============================================================

/// Reject blank identifiers before anything is sent to the service.
fn check_target(app_id: &str, track: &str) -> crate::error::Result<()> {
    if app_id.trim().is_empty() {
        return Err(Error::Usage("application id must not be empty".to_string()));
    }
    if track.trim().is_empty() {
        return Err(Error::Usage("track name must not be empty".to_string()));
    }
    Ok(())
}

async fn has_staged_draft(session: &EditSession<'_>, track: &str) -> crate::error::Result<bool> {
    let bundles = list_bundles_uploaded(session).await?;
    if bundles.is_empty() {
        tracing::info!("No bundles uploaded in edit {}", session.id());
        return Ok(false);
    }

    let releases = list_releases(session, track).await?;
    let staged = selector::has_draft(&releases);
    if !staged {
        tracing::info!("No draft release on '{}'", track);
    }
    Ok(staged)
}

/// Discard an edit the flow no longer needs. A failure here does not change
/// the flow's outcome.
async fn close(session: EditSession<'_>) {
    let id = session.id().to_string();
    if let Err(e) = session.discard().await {
        tracing::warn!("Failed to discard edit {}: {}", id, e);
    }
}

fn failed(flow: &str, error: Error) -> Error {
    tracing::error!("{} flow failed: {}", flow, error);
    error
}

// ============================================================
// Reporting
// ============================================================

impl PublishOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl InspectOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl PromoteOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Published(commit) => write!(f, "Published edit {}", commit.id),
            Self::NothingToPublish => write!(f, "Nothing to publish"),
            Self::Failed(e) => write!(f, "Publish failed: {}", e),
        }
    }
}

impl fmt::Display for InspectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inspected { track, releases } if releases.is_empty() => {
                write!(f, "No completed releases on '{}'", track)
            }
            Self::Inspected { track, releases } => {
                write!(f, "Completed releases on '{}':", track)?;
                for release in releases {
                    write!(f, "\n  {} ({})", release.label(), release.status.as_str())?;
                }
                Ok(())
            }
            Self::Failed(e) => write!(f, "Inspection failed: {}", e),
        }
    }
}

impl fmt::Display for PromoteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Promoted { release, commit } => write!(
                f,
                "Promoted {} to {} (edit {})",
                release.label(),
                release.status.as_str(),
                commit.id
            ),
            Self::NothingToPromote => write!(f, "No draft release to promote"),
            Self::Failed(e) => write!(f, "Promotion failed: {}", e),
        }
    }
}
