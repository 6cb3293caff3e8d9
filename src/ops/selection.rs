use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::item::Item;
use crate::model::tag::Tag;
use crate::model::tree::TreeNode;
use crate::ops::aggregate::subtree_items;

/// Checkbox state of a folder, always derived from the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderState {
    Checked,
    Indeterminate,
    Unchecked,
}

impl FolderState {
    pub fn from_counts(selected: usize, total: usize) -> FolderState {
        if selected == 0 {
            FolderState::Unchecked
        } else if selected >= total {
            FolderState::Checked
        } else {
            FolderState::Indeterminate
        }
    }

    /// Marker used in tree listings
    pub fn marker(self) -> &'static str {
        match self {
            FolderState::Checked => "[x]",
            FolderState::Indeterminate => "[-]",
            FolderState::Unchecked => "[ ]",
        }
    }
}

/// Selected items, each remembered with the tag it was selected under.
/// An item has at most one selection context at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    entries: BTreeMap<String, Tag>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tag_for(&self, item_id: &str) -> Option<&Tag> {
        self.entries.get(item_id)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Deselect when already selected under `tag`, otherwise select under
    /// `tag` (replacing any other context).
    pub fn toggle_item(&mut self, item_id: &str, tag: &Tag) {
        if self.entries.get(item_id) == Some(tag) {
            self.entries.remove(item_id);
        } else {
            self.entries.insert(item_id.to_string(), tag.context());
        }
    }

    /// `toggle_item`, but a no-op when the item does not carry `tag`.
    /// Returns whether anything changed.
    pub fn toggle_item_checked(&mut self, item: &Item, tag: &Tag) -> bool {
        if !item.carries(&tag.id) {
            return false;
        }
        self.toggle_item(&item.id, tag);
        true
    }

    /// Select or deselect every eligible item of a folder.
    ///
    /// Uses the folder's primary tag; folders without one are ignored.
    /// If any eligible item is already selected under that tag, all of them
    /// are deselected; otherwise all of them are selected.
    pub fn toggle_folder(&mut self, node: &TreeNode, items: &[Item]) {
        let Some(tag) = node.primary_tag() else {
            return;
        };
        let eligible = eligible_items(node, items, tag);
        let any_selected = eligible
            .iter()
            .any(|item| self.entries.get(&item.id) == Some(tag));

        if any_selected {
            for item in eligible {
                if self.entries.get(&item.id) == Some(tag) {
                    self.entries.remove(&item.id);
                }
            }
        } else {
            for item in eligible {
                self.entries.insert(item.id.clone(), tag.context());
            }
        }
    }

    /// `(selected, total)` for the folder's primary tag
    pub fn folder_counts(&self, node: &TreeNode, items: &[Item]) -> (usize, usize) {
        let Some(tag) = node.primary_tag() else {
            return (0, 0);
        };
        let eligible = eligible_items(node, items, tag);
        let selected = eligible
            .iter()
            .filter(|item| self.entries.get(&item.id) == Some(tag))
            .count();
        (selected, eligible.len())
    }

    pub fn folder_state(&self, node: &TreeNode, items: &[Item]) -> FolderState {
        let (selected, total) = self.folder_counts(node, items);
        FolderState::from_counts(selected, total)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop entries whose item or tag no longer exists. The rest take the
    /// current name and path of their tag.
    pub fn retain_known(&mut self, items: &[Item], tags: &[Tag]) {
        self.entries.retain(|item_id, tag| {
            if !items.iter().any(|i| &i.id == item_id) {
                return false;
            }
            match tags.iter().find(|t| t.id == tag.id) {
                Some(current) => {
                    *tag = current.context();
                    true
                }
                None => false,
            }
        });
    }
}

/// Items in the folder's subtree that actually carry `tag`
fn eligible_items<'a>(node: &TreeNode, items: &'a [Item], tag: &Tag) -> Vec<&'a Item> {
    subtree_items(node, items)
        .into_iter()
        .filter(|item| item.carries(&tag.id))
        .collect()
}
