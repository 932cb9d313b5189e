//! Reading tracks and uploaded bundles within an open edit.

use crate::error::Result;
use crate::models::{BundleRef, Release, Track};
use crate::session::EditSession;

/// Read a track as it currently stands within `session`.
pub async fn read_track(session: &EditSession<'_>, track: &str) -> Result<Track> {
    let track = session
        .publisher()
        .get_track(session.app_id(), session.id(), track)
        .await?;
    tracing::debug!(
        "Track '{}' has {} release(s) in edit {}",
        track.name,
        track.releases.len(),
        session.id()
    );
    Ok(track)
}

/// The releases on `track` within `session`.
pub async fn list_releases(session: &EditSession<'_>, track: &str) -> Result<Vec<Release>> {
    Ok(read_track(session, track).await?.releases)
}

/// Bundles uploaded within `session`, regardless of track.
pub async fn list_bundles_uploaded(session: &EditSession<'_>) -> Result<Vec<BundleRef>> {
    let bundles = session
        .publisher()
        .list_bundles(session.app_id(), session.id())
        .await?;
    tracing::debug!("Edit {} lists {} bundle(s)", session.id(), bundles.len());
    Ok(bundles)
}
