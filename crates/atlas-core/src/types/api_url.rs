//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// Base URL of a Data API or a deployed service.
///
/// Either an API Gateway stage such as
/// `https://abc123.execute-api.us-east-1.amazonaws.com/prod`, or a
/// `file:///path/to/store` root for the file-backed Data API.
///
/// ```
/// use atlas_core::ApiUrl;
///
/// let api = ApiUrl::new("https://abc.execute-api.us-east-1.amazonaws.com/prod/").unwrap();
/// assert_eq!(api.endpoint_url("insertOne"),
///            "https://abc.execute-api.us-east-1.amazonaws.com/prod/insertOne");
///
/// let local = ApiUrl::new("file:///tmp/atlas-store").unwrap();
/// assert!(local.is_local());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiUrl(Url);

fn reject(value: &str, reason: impl Into<String>) -> Error {
    InvalidInputError::ApiUrl {
        value: value.to_string(),
        reason: reason.into(),
    }
    .into()
}

fn is_loopback(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "[::1]")
}

impl ApiUrl {
    /// Parse and validate a base URL.
    ///
    /// Plain HTTP is accepted only for loopback hosts.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| reject(s, e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(reject(s, "must be an absolute URL"));
        }

        match (url.scheme(), url.host_str()) {
            ("file", _) => {}
            (_, None) => return Err(reject(s, "must have a host")),
            ("https", Some(_)) => {}
            ("http", Some(host)) if is_loopback(host) => {}
            _ => return Err(reject(s, "must use HTTPS (HTTP allowed only for localhost)")),
        }

        Ok(Self(url))
    }

    /// The URL for a named endpoint beneath this base, keeping any stage
    /// path.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.0.as_str().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// True for `file://` stores.
    pub fn is_local(&self) -> bool {
        self.0.scheme() == "file"
    }

    /// Filesystem root of a `file://` store, `None` otherwise.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        self.is_local()
            .then(|| self.0.to_file_path().ok())
            .flatten()
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ApiUrl {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ApiUrl> for String {
    fn from(url: ApiUrl) -> Self {
        url.0.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_stage_and_loopback_are_accepted() {
        assert!(ApiUrl::new("https://abc.execute-api.us-east-1.amazonaws.com/prod").is_ok());
        assert!(ApiUrl::new("http://127.0.0.1:8080").is_ok());
        assert!(ApiUrl::new("http://localhost:3000/dev").is_ok());
    }

    #[test]
    fn endpoint_url_keeps_stage_path() {
        let api = ApiUrl::new("https://api.example.com/prod").unwrap();
        assert_eq!(api.endpoint_url("find"), "https://api.example.com/prod/find");
    }

    #[test]
    fn endpoint_url_tolerates_trailing_slash() {
        let api = ApiUrl::new("https://api.example.com/prod/").unwrap();
        assert_eq!(
            api.endpoint_url("aggregate"),
            "https://api.example.com/prod/aggregate"
        );
        assert_eq!(
            api.endpoint_url("/todos/42"),
            "https://api.example.com/prod/todos/42"
        );
    }

    #[test]
    fn endpoint_url_on_bare_host() {
        let api = ApiUrl::new("https://api.example.com").unwrap();
        assert_eq!(api.endpoint_url("search"), "https://api.example.com/search");
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(ApiUrl::new("http://api.example.com").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::new("/prod/find").is_err());
    }

    #[test]
    fn valid_file_url() {
        let api = ApiUrl::new("file:///tmp/atlas-store").unwrap();
        assert!(api.is_local());
    }

    #[cfg(unix)]
    #[test]
    fn file_url_to_path() {
        let api = ApiUrl::new("file:///tmp/atlas-store").unwrap();
        let path = api.to_file_path().unwrap();
        assert_eq!(path, std::path::PathBuf::from("/tmp/atlas-store"));
    }

    #[test]
    fn serde_goes_through_validation() {
        let api: ApiUrl = serde_json::from_str(r#""https://api.example.com/prod""#).unwrap();
        assert_eq!(serde_json::to_string(&api).unwrap(), r#""https://api.example.com/prod""#);
        assert!(serde_json::from_str::<ApiUrl>(r#""http://api.example.com""#).is_err());
    }

    #[test]
    fn network_url_not_local() {
        let api = ApiUrl::new("https://api.example.com").unwrap();
        assert!(!api.is_local());
        assert!(api.to_file_path().is_none());
    }
}
