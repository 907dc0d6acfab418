use std::fmt;

use serde::{Deserialize, Serialize};

/// Address of a resource inside an organization/repository namespace.
///
/// The path is stored without a leading slash, e.g. `assets/img.png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceLocation {
    pub org: String,
    pub repo: String,
    pub path: String,
}

impl ResourceLocation {
    pub fn new(org: impl Into<String>, repo: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            path: path.into(),
        }
    }

    /// Path segments of the resource, skipping empty components.
    pub fn path_segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|segment| !segment.is_empty())
    }

    /// File name portion of the path, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.path_segments().last()
    }

    /// A location in the same namespace with a different path.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            org: self.org.clone(),
            repo: self.repo.clone(),
            path: path.into(),
        }
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}/{}", self.org, self.repo)
        } else {
            write!(f, "{}/{}/{}", self.org, self.repo, self.path)
        }
    }
}
