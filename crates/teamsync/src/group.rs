//! Identity groups and the sources that produce them.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Opaque identity-group identifier.
///
/// SCIM directories hand out GUIDs while GitHub's external-group listing
/// uses integers, so the id is kept as a string and only converted where an
/// API insists on a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form of the id, for endpoints that require one.
    pub fn to_numeric(&self) -> Result<u64> {
        self.0
            .trim()
            .parse::<u64>()
            .map_err(|_| SyncError::InvalidGroupId { id: self.0.clone() })
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for GroupId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// A group from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityGroup {
    pub id: GroupId,
    pub display_name: String,
}

impl IdentityGroup {
    pub fn new(id: impl Into<GroupId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Something that can list the identity groups to reconcile.
#[async_trait]
pub trait GroupSource: Send + Sync {
    /// Short label for progress output ("scim", "github").
    fn label(&self) -> &'static str;

    /// Fetch every group, in the order the source returns them.
    async fn fetch_groups(&self) -> Result<Vec<IdentityGroup>>;
}
