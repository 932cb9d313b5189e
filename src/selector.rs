//! Release selection policies.
//!
//! All policies are total and deterministic: they never depend on the order
//! in which the service listed the releases.

use std::cmp::Ordering;

use crate::models::{Release, ReleaseStatus};

/// Whether any release is still a draft.
pub fn has_draft(releases: &[Release]) -> bool {
    releases.iter().any(Release::is_draft)
}

/// The draft with the highest leading version code, if any.
///
/// Drafts that share a leading code are ordered by their full version code
/// sequence, then by name.
pub fn latest_draft(releases: &[Release]) -> Option<&Release> {
    releases
        .iter()
        .filter(|r| r.is_draft())
        .max_by(|a, b| version_order(a, b))
}

/// Releases that have completed rollout, in track order.
pub fn completed(releases: &[Release]) -> Vec<&Release> {
    releases
        .iter()
        .filter(|r| r.status == ReleaseStatus::Completed)
        .collect()
}

fn version_order(a: &Release, b: &Release) -> Ordering {
    a.leading_version_code()
        .cmp(&b.leading_version_code())
        .then_with(|| a.version_codes.cmp(&b.version_codes))
        .then_with(|| a.name.cmp(&b.name))
}
