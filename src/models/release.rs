use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A distributable unit on a track, identified by one or more version codes.
///
/// A release may bundle several build variants (e.g. per-ABI builds) that
/// share one release record, so `version_codes` is a sequence. Fields the
/// publishing service returns that this crate does not model (release notes,
/// user fraction, country targeting, ...) are kept in `extra` so that writing
/// a track back never drops them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Version codes in the order the service reports them.
    #[serde(default, with = "version_codes")]
    pub version_codes: Vec<i64>,
    #[serde(default)]
    pub status: ReleaseStatus,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Release {
    pub fn new(version_codes: Vec<i64>, status: ReleaseStatus) -> Self {
        Self {
            name: None,
            version_codes,
            status,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_draft(&self) -> bool {
        self.status == ReleaseStatus::Draft
    }

    /// The first version code, which is what releases are ordered by.
    pub fn leading_version_code(&self) -> Option<i64> {
        self.version_codes.first().copied()
    }

    pub fn contains_version_code(&self, version_code: i64) -> bool {
        self.version_codes.contains(&version_code)
    }

    /// Label used in status output: the release name if present, else its codes.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} {:?}", name, self.version_codes),
            None => format!("{:?}", self.version_codes),
        }
    }
}

/// The rollout status of a release.
///
/// - `Draft`: Staged but not yet rolled out
/// - `InProgress`: Rolling out to a fraction of users
/// - `Halted`: Rollout paused
/// - `Completed`: Rolled out to all users of the track
/// - `Unspecified`: Any status value this crate does not recognise
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ReleaseStatus {
    Draft,
    InProgress,
    Halted,
    Completed,
    #[default]
    #[serde(rename = "statusUnspecified", other)]
    Unspecified,
}

impl ReleaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "inProgress",
            Self::Halted => "halted",
            Self::Completed => "completed",
            Self::Unspecified => "statusUnspecified",
        }
    }
}

impl FromStr for ReleaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "inProgress" => Ok(Self::InProgress),
            "halted" => Ok(Self::Halted),
            "completed" => Ok(Self::Completed),
            "statusUnspecified" => Ok(Self::Unspecified),
            _ => Err(format!("unknown release status: {}", s)),
        }
    }
}

/// Version codes travel as decimal strings on the wire (they are int64 values).
/// Plain JSON numbers are accepted too.
mod version_codes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(i64),
    }

    pub fn serialize<S: Serializer>(codes: &[i64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(codes.iter().map(|c| c.to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
        Vec::<Code>::deserialize(deserializer)?
            .into_iter()
            .map(|code| match code {
                Code::Number(n) => Ok(n),
                Code::Text(s) => s
                    .parse()
                    .map_err(|_| de::Error::custom(format!("invalid version code: {}", s))),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_string_version_codes() {
        let release: Release = serde_json::from_value(json!({
            "name": "1.4.0",
            "versionCodes": ["12", "13"],
            "status": "draft"
        }))
        .unwrap();

        assert_eq!(release.version_codes, vec![12, 13]);
        assert_eq!(release.status, ReleaseStatus::Draft);
        assert_eq!(release.leading_version_code(), Some(12));
    }

    #[test]
    fn keeps_unmodelled_fields_on_write_back() {
        let raw = json!({
            "versionCodes": ["7"],
            "status": "inProgress",
            "userFraction": 0.2,
            "releaseNotes": [{ "language": "en-US", "text": "Fixes" }]
        });
        let release: Release = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(release.status, ReleaseStatus::InProgress);
        assert_eq!(serde_json::to_value(&release).unwrap(), raw);
    }

    #[test]
    fn unknown_status_becomes_unspecified() {
        let release: Release =
            serde_json::from_value(json!({ "versionCodes": [3], "status": "rolledBack" })).unwrap();
        assert_eq!(release.status, ReleaseStatus::Unspecified);
    }

    #[test]
    fn rejects_non_numeric_version_code() {
        let result: Result<Release, _> =
            serde_json::from_value(json!({ "versionCodes": ["abc"], "status": "draft" }));
        assert!(result.is_err());
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            ReleaseStatus::Draft,
            ReleaseStatus::InProgress,
            ReleaseStatus::Halted,
            ReleaseStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<ReleaseStatus>(), Ok(status));
        }
    }

    #[test]
    fn parsing_unknown_status_fails() {
        assert!("rolledBack".parse::<ReleaseStatus>().is_err());
    }
}
