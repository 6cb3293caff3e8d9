use std::fs;
use std::path::Path;

use crate::io::workspace_io::{WorkspaceError, atomic_write};
use crate::model::config::ShelfConfig;

pub const CONFIG_FILE: &str = "shelf.toml";

/// Read and parse `shelf.toml`
pub fn read_config(shelf_dir: &Path) -> Result<ShelfConfig, WorkspaceError> {
    let config_path = shelf_dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&config_text)?)
}

/// The config written by `shelf init`, with every default spelled out
pub fn default_config_text(name: &str) -> String {
    let quoted = toml::Value::String(name.to_string()).to_string();
    format!(
        "\
[shelf]
name = {quoted}

[browse]
# items fetched per page when browsing a folder
page_size = 20

[ui]
# document | prompt | profile | chat_context
default_type = \"document\"
max_name_width = 60

[permissions]
delete_folders = true
remove_items = true
share_items = true
"
    )
}

pub fn write_default_config(shelf_dir: &Path, name: &str) -> Result<(), WorkspaceError> {
    let path = shelf_dir.join(CONFIG_FILE);
    atomic_write(&path, default_config_text(name).as_bytes())
        .map_err(|e| WorkspaceError::WriteError { path, source: e })
}
