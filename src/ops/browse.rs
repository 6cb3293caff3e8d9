use std::collections::HashMap;

use crate::model::item::{Item, ItemPage};
use crate::model::tree::TreeNode;
use crate::ops::aggregate::collect_descendant_tags;
use crate::ops::api::{ApiError, ItemSource};

/// Error type for browse operations
#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    #[error("page size must be at least 1")]
    ZeroPageSize,
    #[error("could not load items for tag {tag_id}: {source}")]
    Fetch { tag_id: String, source: ApiError },
}

/// Items loaded so far for one tag
#[derive(Debug, Clone, Default)]
pub struct TagSlot {
    pub items: Vec<Item>,
    /// Total reported by the last page, `None` before the first load
    pub total: Option<usize>,
}

impl TagSlot {
    pub fn loaded(&self) -> usize {
        self.items.len()
    }

    pub fn is_complete(&self) -> bool {
        self.total.is_some_and(|t| self.items.len() >= t)
    }
}

/// Paginated item lists, one independent slot per tag id
#[derive(Debug, Default)]
pub struct BrowseCache {
    slots: HashMap<String, TagSlot>,
}

impl BrowseCache {
    pub fn new() -> Self {
        BrowseCache::default()
    }

    pub fn slot(&self, tag_id: &str) -> Option<&TagSlot> {
        self.slots.get(tag_id)
    }

    pub fn items(&self, tag_id: &str) -> &[Item] {
        self.slots
            .get(tag_id)
            .map(|s| s.items.as_slice())
            .unwrap_or(&[])
    }

    /// Fetch the next page for `tag_id` and append it.
    /// Returns the number of new items. A failed fetch changes nothing.
    pub fn load_more<S: ItemSource + ?Sized>(
        &mut self,
        source: &S,
        tag_id: &str,
        limit: usize,
    ) -> Result<usize, BrowseError> {
        if limit == 0 {
            return Err(BrowseError::ZeroPageSize);
        }
        let offset = self.slots.get(tag_id).map_or(0, |s| s.loaded());
        let page = source
            .fetch_page(&[tag_id.to_string()], offset, limit)
            .map_err(|e| BrowseError::Fetch {
                tag_id: tag_id.to_string(),
                source: e,
            })?;
        let added = page.items.len();
        tracing::debug!(tag_id, offset, added, total = page.total, "loaded page");

        let slot = self.slots.entry(tag_id.to_string()).or_default();
        slot.items.extend(page.items);
        slot.total = Some(page.total);
        Ok(added)
    }

    /// Page until everything for `tag_id` is loaded
    pub fn load_all<S: ItemSource + ?Sized>(
        &mut self,
        source: &S,
        tag_id: &str,
        limit: usize,
    ) -> Result<&[Item], BrowseError> {
        loop {
            if self.slots.get(tag_id).is_some_and(|s| s.is_complete()) {
                break;
            }
            if self.load_more(source, tag_id, limit)? == 0 {
                break;
            }
        }
        Ok(self.items(tag_id))
    }

    pub fn invalidate(&mut self, tag_id: &str) {
        self.slots.remove(tag_id);
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

/// One bulk query for everything under a folder, filtered by all of its
/// descendant tag ids.
pub fn browse_folder<S: ItemSource + ?Sized>(
    source: &S,
    node: &TreeNode,
    offset: usize,
    limit: usize,
) -> Result<ItemPage, ApiError> {
    let tag_ids: Vec<String> = collect_descendant_tags(node)
        .into_iter()
        .map(|t| t.id.clone())
        .collect();
    if tag_ids.is_empty() {
        return Ok(ItemPage::default());
    }
    source.fetch_page(&tag_ids, offset, limit)
}
