use serde::{Deserialize, Serialize};

/// An edit resource as issued by the publishing service.
///
/// Returned both when an edit is opened and when it is committed; in the
/// latter case it is the commit result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppEdit {
    pub id: String,
    /// Seconds since the epoch at which the edit expires, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time_seconds: Option<String>,
}

/// Result of committing an edit.
pub type CommitResult = AppEdit;
