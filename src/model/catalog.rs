use std::path::PathBuf;

use super::config::ShelfConfig;
use super::item::Item;
use super::tag::Tag;

/// The tag and item lists as last fetched
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub tags: Vec<Tag>,
    pub items: Vec<Item>,
}

impl Catalog {
    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    pub fn tag_mut(&mut self, id: &str) -> Option<&mut Tag> {
        self.tags.iter_mut().find(|t| t.id == id)
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }
}

/// A fully loaded shelf workspace
#[derive(Debug)]
pub struct Workspace {
    /// Directory containing `.shelf/`
    pub root: PathBuf,
    /// Path to the `.shelf/` directory
    pub shelf_dir: PathBuf,
    /// Parsed shelf.toml
    pub config: ShelfConfig,
    pub catalog: Catalog,
}
