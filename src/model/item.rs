use serde::{Deserialize, Serialize};

/// A library member (document, prompt, profile). Only its tag membership
/// matters to the tree; everything else is owned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(alias = "document_uid", alias = "uid")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Tags this item carries
    #[serde(default)]
    pub tag_ids: Vec<String>,
}

impl Item {
    pub fn new(id: &str, name: &str, tag_ids: &[&str]) -> Self {
        Item {
            id: id.to_string(),
            name: name.to_string(),
            tag_ids: tag_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn carries(&self, tag_id: &str) -> bool {
        self.tag_ids.iter().any(|t| t == tag_id)
    }
}

/// One page of a browse query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPage {
    pub items: Vec<Item>,
    /// Total number of matching items across all pages
    pub total: usize,
}
