//! Datastore value type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A storage-provider-managed storage pool from which volumes are carved.
///
/// Identity for every set operation is the URL, which is globally unique
/// within a provider domain. All other fields are descriptive only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreInfo {
    /// Datastore URL, e.g. `ds:///vmfs/volumes/5d119112-7b28fe05/`.
    pub url: String,
    /// Human-readable datastore name.
    pub name: String,
}

impl DatastoreInfo {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for DatastoreInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}
