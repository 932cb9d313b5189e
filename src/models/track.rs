use serde::{Deserialize, Serialize};

use super::release::Release;

/// A named distribution channel (e.g. `internal`, `production`) and the
/// releases it carries as seen within one edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    #[serde(rename = "track")]
    pub name: String,
    #[serde(default)]
    pub releases: Vec<Release>,
}

impl Track {
    pub fn new(name: impl Into<String>, releases: Vec<Release>) -> Self {
        Self {
            name: name.into(),
            releases,
        }
    }
}
