//! Release status transitions within an edit.

use crate::error::{Error, Result};
use crate::models::{Release, ReleaseStatus, Track};
use crate::session::EditSession;
use crate::track::read_track;

/// Set `status` on every release containing `version_code`.
///
/// Returns how many releases matched; the others are left untouched.
pub fn apply_status(releases: &mut [Release], version_code: i64, status: ReleaseStatus) -> usize {
    let mut matched = 0;
    for release in releases
        .iter_mut()
        .filter(|r| r.contains_version_code(version_code))
    {
        release.status = status;
        matched += 1;
    }
    matched
}

/// Re-read `track`, move the release containing `version_code` to `status`,
/// and stage the full release list back into the edit.
///
/// The edit is not committed. Fails with [`Error::ReleaseNotFound`] when the
/// re-read track no longer holds that version code.
pub async fn promote(
    session: &EditSession<'_>,
    track: &str,
    version_code: i64,
    status: ReleaseStatus,
) -> Result<Track> {
    let mut current = read_track(session, track).await?;

    if apply_status(&mut current.releases, version_code, status) == 0 {
        return Err(Error::ReleaseNotFound {
            track: track.to_string(),
            version_code,
        });
    }

    let updated = session
        .publisher()
        .update_track(session.app_id(), session.id(), track, &current.releases)
        .await?;
    tracing::info!(
        "Staged version code {} on '{}' as {}",
        version_code,
        track,
        status.as_str()
    );
    Ok(updated)
}
