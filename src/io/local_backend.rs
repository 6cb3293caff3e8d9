use crate::model::catalog::Catalog;
use crate::model::config::PermissionConfig;
use crate::model::item::ItemPage;
use crate::ops::api::{Action, ApiError, ItemSource, LibraryApi, Permissions, Resource};

/// Serves browse queries and membership mutations from an in-memory
/// catalog, keeping `Tag::item_ids` and `Item::tag_ids` in agreement.
pub struct LocalLibrary<'a> {
    catalog: &'a mut Catalog,
}

impl<'a> LocalLibrary<'a> {
    pub fn new(catalog: &'a mut Catalog) -> Self {
        LocalLibrary { catalog }
    }

    fn require_tag(&self, tag_id: &str) -> Result<(), ApiError> {
        match self.catalog.tag(tag_id) {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found(&format!("tag {}", tag_id))),
        }
    }

    fn require_item(&self, item_id: &str) -> Result<(), ApiError> {
        match self.catalog.item(item_id) {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found(&format!("item {}", item_id))),
        }
    }
}

impl ItemSource for LocalLibrary<'_> {
    fn fetch_page(
        &self,
        tag_ids: &[String],
        offset: usize,
        limit: usize,
    ) -> Result<ItemPage, ApiError> {
        let matching: Vec<_> = self
            .catalog
            .items
            .iter()
            .filter(|item| tag_ids.iter().any(|t| item.carries(t)))
            .collect();
        Ok(ItemPage {
            total: matching.len(),
            items: matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
        })
    }
}

impl LibraryApi for LocalLibrary<'_> {
    fn remove_item(&mut self, tag_id: &str, item_id: &str) -> Result<(), ApiError> {
        self.require_tag(tag_id)?;
        self.require_item(item_id)?;
        let mut changed = false;
        if let Some(tag) = self.catalog.tag_mut(tag_id) {
            let before = tag.item_ids.len();
            tag.item_ids.retain(|id| id != item_id);
            changed |= tag.item_ids.len() != before;
        }
        if let Some(item) = self.catalog.item_mut(item_id) {
            let before = item.tag_ids.len();
            item.tag_ids.retain(|id| id != tag_id);
            changed |= item.tag_ids.len() != before;
        }
        if !changed {
            return Err(ApiError::not_found(&format!("{} in tag {}", item_id, tag_id)));
        }
        Ok(())
    }

    fn add_item(&mut self, tag_id: &str, item_id: &str) -> Result<(), ApiError> {
        self.require_tag(tag_id)?;
        self.require_item(item_id)?;
        if let Some(tag) = self.catalog.tag_mut(tag_id)
            && !tag.item_ids.iter().any(|id| id == item_id)
        {
            tag.item_ids.push(item_id.to_string());
        }
        if let Some(item) = self.catalog.item_mut(item_id)
            && !item.carries(tag_id)
        {
            item.tag_ids.push(tag_id.to_string());
        }
        Ok(())
    }

    fn delete_tag(&mut self, tag_id: &str) -> Result<(), ApiError> {
        self.require_tag(tag_id)?;
        self.catalog.tags.retain(|t| t.id != tag_id);
        for item in &mut self.catalog.items {
            item.tag_ids.retain(|id| id != tag_id);
        }
        Ok(())
    }
}

/// Permission answers taken from `[permissions]` in shelf.toml
pub struct ConfigPermissions {
    config: PermissionConfig,
}

impl ConfigPermissions {
    pub fn new(config: &PermissionConfig) -> Self {
        ConfigPermissions {
            config: config.clone(),
        }
    }
}

impl Permissions for ConfigPermissions {
    fn can(&self, action: Action, resource: Resource) -> bool {
        match (action, resource) {
            (Action::Read, _) => true,
            (Action::Delete, Resource::Tag) => self.config.delete_folders,
            (Action::Delete, _) => self.config.remove_items,
            (Action::Update, Resource::Tag) => {
                self.config.remove_items || self.config.share_items
            }
            (Action::Create, _) | (Action::Update, _) => self.config.share_items,
        }
    }
}
