//! Remote repository URLs and revision markers.
//!
//! A build started by a comment carries a [`RevisionMarker`]: the revision it
//! was asked to build and the remote that revision came from. A later comment
//! on the same pull request uses the marker to find builds it supersedes.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteUrlError {
    #[error("remote URL is empty")]
    Empty,

    #[error("remote URL `{url}` contains whitespace")]
    Whitespace { url: String },

    #[error("remote URL `{url}` has no host")]
    MissingHost { url: String },

    #[error("remote URL `{url}` has an invalid port")]
    InvalidPort { url: String },

    #[error("remote URL `{url}` is not a URL, scp-style address or absolute path")]
    Unrecognized { url: String },
}

/// A parsed Git remote URL.
///
/// Accepts `scheme://[user@]host[:port]/path`, scp-style `[user@]host:path`
/// and absolute local paths. Two URLs are equal when scheme, host (ignoring
/// case), port and path (ignoring a trailing `/` or `.git`) agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteUrl {
    raw: String,
    scheme: Option<String>,
    host: String,
    port: Option<u16>,
    path: String,
}

impl RemoteUrl {
    pub fn parse(url: &str) -> Result<Self, RemoteUrlError> {
        let raw = url.trim();
        if raw.is_empty() {
            return Err(RemoteUrlError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(RemoteUrlError::Whitespace {
                url: raw.to_string(),
            });
        }

        if let Some((scheme, rest)) = raw.split_once("://") {
            if scheme.is_empty()
                || !scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
            {
                return Err(RemoteUrlError::Unrecognized {
                    url: raw.to_string(),
                });
            }
            let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
            let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
            let (host, port) = split_host_port(host_port).ok_or_else(|| {
                RemoteUrlError::InvalidPort {
                    url: raw.to_string(),
                }
            })?;
            if host.is_empty() && scheme != "file" {
                return Err(RemoteUrlError::MissingHost {
                    url: raw.to_string(),
                });
            }
            return Ok(RemoteUrl::from_parts(
                raw,
                Some(scheme.to_ascii_lowercase()),
                host,
                port,
                path,
            ));
        }

        if raw.starts_with('/') {
            return Ok(RemoteUrl::from_parts(raw, None, "", None, raw));
        }

        // scp-style: the colon must come before any slash.
        match raw.split_once(':') {
            Some((authority, path)) if !authority.contains('/') => {
                let host = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
                if host.is_empty() {
                    return Err(RemoteUrlError::MissingHost {
                        url: raw.to_string(),
                    });
                }
                Ok(RemoteUrl::from_parts(raw, Some("ssh".to_string()), host, None, path))
            }
            _ => Err(RemoteUrlError::Unrecognized {
                url: raw.to_string(),
            }),
        }
    }

    fn from_parts(
        raw: &str,
        scheme: Option<String>,
        host: &str,
        port: Option<u16>,
        path: &str,
    ) -> Self {
        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        RemoteUrl {
            raw: raw.to_string(),
            scheme,
            host: host.to_ascii_lowercase(),
            port,
            path: path.trim_end_matches('/').to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Splits `host[:port]`, keeping a bracketed IPv6 host such as `[::1]`
/// intact. Returns `None` when the port is not a valid number.
fn split_host_port(authority: &str) -> Option<(&str, Option<u16>)> {
    let (host, port) = match authority.strip_prefix('[') {
        Some(bracketed) => {
            let end = bracketed.find(']')? + 2;
            let (host, rest) = authority.split_at(end);
            match rest {
                "" => (host, None),
                _ => (host, Some(rest.strip_prefix(':')?)),
            }
        }
        None => match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        },
    };
    match port {
        Some(port) => Some((host, Some(port.parse::<u16>().ok()?))),
        None => Some((host, None)),
    }
}

impl PartialEq for RemoteUrl {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.host == other.host
            && self.port == other.port
            && self.path == other.path
    }
}

impl Eq for RemoteUrl {}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for RemoteUrl {
    type Error = RemoteUrlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RemoteUrl::parse(&value)
    }
}

impl From<RemoteUrl> for String {
    fn from(url: RemoteUrl) -> Self {
        url.raw
    }
}

/// A named remote with its fetch URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub name: String,
    pub urls: Vec<RemoteUrl>,
}

impl RemoteConfig {
    /// A remote with a single URL.
    pub fn new(name: impl Into<String>, url: &str) -> Result<Self, RemoteUrlError> {
        Ok(RemoteConfig {
            name: name.into(),
            urls: vec![RemoteUrl::parse(url)?],
        })
    }
}

/// The revision a build was started for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionMarker {
    /// A commit SHA or a symbolic ref, exactly as requested.
    pub commit: String,
    /// The remote the revision was fetched from. `None` means any remote.
    pub origin: Option<RemoteUrl>,
}

impl RevisionMarker {
    pub fn new(commit: impl Into<String>, origin: Option<RemoteUrl>) -> Self {
        RevisionMarker {
            commit: commit.into(),
            origin,
        }
    }

    /// Whether the marked revision could have come from one of `remotes`.
    pub fn can_originate_from(&self, remotes: &[RemoteConfig]) -> bool {
        match &self.origin {
            None => true,
            Some(origin) => remotes
                .iter()
                .flat_map(|remote| &remote.urls)
                .any(|url| url == origin),
        }
    }
}
