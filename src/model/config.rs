use serde::{Deserialize, Serialize};

use super::tag::TagType;

/// Configuration from shelf.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShelfConfig {
    pub shelf: ShelfInfo,
    #[serde(default)]
    pub browse: BrowseConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub permissions: PermissionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShelfInfo {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseConfig {
    /// Items fetched per "load more"
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        BrowseConfig {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    20
}

fn default_true() -> bool {
    true
}

fn default_name_width() -> usize {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Library shown when no `--type` is given
    #[serde(default)]
    pub default_type: TagType,
    /// Item and folder names wider than this are truncated with `…`
    #[serde(default = "default_name_width")]
    pub max_name_width: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            default_type: TagType::default(),
            max_name_width: default_name_width(),
        }
    }
}

/// Answers for the permission oracle when running against a local workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionConfig {
    #[serde(default = "default_true")]
    pub delete_folders: bool,
    #[serde(default = "default_true")]
    pub remove_items: bool,
    #[serde(default = "default_true")]
    pub share_items: bool,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        PermissionConfig {
            delete_folders: true,
            remove_items: true,
            share_items: true,
        }
    }
}
