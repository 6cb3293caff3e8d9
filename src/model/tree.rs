use indexmap::IndexMap;
use serde::Serialize;

use super::tag::Tag;

/// A folder derived from tag paths. Rebuilt from scratch whenever the tag
/// list changes; `full` is the only stable key across rebuilds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    /// Single path segment (empty for the root)
    pub name: String,
    /// Segments from the root joined by `/` (empty for the root)
    pub full: String,
    /// Child folders keyed by segment name
    pub children: IndexMap<String, TreeNode>,
    /// Tags whose full path ends exactly here
    pub tags_here: Vec<Tag>,
}

impl TreeNode {
    pub fn root() -> Self {
        TreeNode::default()
    }

    pub fn is_root(&self) -> bool {
        self.full.is_empty()
    }

    /// The tag that drives single-tag operations on this folder
    pub fn primary_tag(&self) -> Option<&Tag> {
        self.tags_here.first()
    }
}
