//! Repository and user snapshots embedded in webhook events.

use serde::{Deserialize, Serialize};

use super::ids::ProjectId;

/// A read-only snapshot of a repository as described by the Git host.
///
/// Every field except `id` may be missing from a payload; missing strings are
/// kept as empty strings so cause records never carry `null`s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub id: ProjectId,
    pub name: String,
    pub namespace: String,
    pub homepage: String,
    pub url: String,
    pub ssh_url: String,
    pub http_url: String,
    pub path_with_namespace: String,
}

/// A user on the Git host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// The login name.
    pub username: String,
    /// The display name.
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        User {
            username: username.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}
