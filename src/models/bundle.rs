use serde::{Deserialize, Serialize};

/// An app bundle uploaded within an edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BundleRef {
    pub version_code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl BundleRef {
    pub fn new(version_code: i64) -> Self {
        Self {
            version_code,
            sha1: None,
            sha256: None,
        }
    }
}

/// Response body of the bundle listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundlesListResponse {
    #[serde(default)]
    pub bundles: Vec<BundleRef>,
}
