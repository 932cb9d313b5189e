//! Runtime configuration loaded from environment variables.
//!
//! - `PLAYTRACK_API_URL` - Base URL of the applications resource
//!   (default: [`DEFAULT_API_URL`])
//! - `PLAYTRACK_ACCESS_TOKEN` - Bearer token to use instead of the credential file

/// Production endpoint of the applications resource.
pub const DEFAULT_API_URL: &str =
    "https://androidpublisher.googleapis.com/androidpublisher/v3/applications";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub access_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_token: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("PLAYTRACK_API_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let access_token = lookup("PLAYTRACK_ACCESS_TOKEN").filter(|s| !s.trim().is_empty());

        Self {
            api_url,
            access_token,
        }
    }
}
