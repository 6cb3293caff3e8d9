use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::io::config_io;
use crate::model::catalog::{Catalog, Workspace};

/// Name of the per-workspace directory
pub const SHELF_DIR: &str = ".shelf";
pub const TAGS_FILE: &str = "tags.json";
pub const ITEMS_FILE: &str = "items.json";

/// Error type for workspace I/O operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a shelf workspace: no .shelf/ directory found")]
    NotAWorkspace,
    #[error("workspace already exists at {0}")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    JsonError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not parse shelf.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
}

/// Walk up from `start` looking for a directory containing `.shelf/shelf.toml`
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        let shelf_dir = current.join(SHELF_DIR);
        if shelf_dir.is_dir() && shelf_dir.join(config_io::CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Load config and catalog from a workspace root
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let shelf_dir = root.join(SHELF_DIR);
    if !shelf_dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }
    let config = config_io::read_config(&shelf_dir)?;
    let catalog = load_catalog(&shelf_dir)?;
    tracing::debug!(
        root = %root.display(),
        tags = catalog.tags.len(),
        items = catalog.items.len(),
        "loaded workspace"
    );
    Ok(Workspace {
        root: root.to_path_buf(),
        shelf_dir,
        config,
        catalog,
    })
}

/// Read `tags.json` and `items.json`. Missing files mean empty lists.
pub fn load_catalog(shelf_dir: &Path) -> Result<Catalog, WorkspaceError> {
    Ok(Catalog {
        tags: read_json_list(&shelf_dir.join(TAGS_FILE))?,
        items: read_json_list(&shelf_dir.join(ITEMS_FILE))?,
    })
}

fn read_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, WorkspaceError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path).map_err(|e| WorkspaceError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| WorkspaceError::JsonError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write both catalog files back to disk
pub fn save_catalog(shelf_dir: &Path, catalog: &Catalog) -> Result<(), WorkspaceError> {
    write_json(&shelf_dir.join(TAGS_FILE), &catalog.tags)?;
    write_json(&shelf_dir.join(ITEMS_FILE), &catalog.items)
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), WorkspaceError> {
    let content = serde_json::to_string_pretty(value).map_err(|e| WorkspaceError::JsonError {
        path: path.to_path_buf(),
        source: e,
    })?;
    atomic_write(path, content.as_bytes()).map_err(|e| WorkspaceError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create `.shelf/` with a default config and empty catalog
pub fn init_workspace(root: &Path, name: &str, force: bool) -> Result<PathBuf, WorkspaceError> {
    let shelf_dir = root.join(SHELF_DIR);
    if shelf_dir.join(config_io::CONFIG_FILE).exists() && !force {
        return Err(WorkspaceError::AlreadyExists(shelf_dir));
    }
    fs::create_dir_all(&shelf_dir).map_err(|e| WorkspaceError::WriteError {
        path: shelf_dir.clone(),
        source: e,
    })?;
    config_io::write_default_config(&shelf_dir, name)?;
    if !shelf_dir.join(TAGS_FILE).exists() || force {
        save_catalog(&shelf_dir, &Catalog::default())?;
    }
    Ok(shelf_dir)
}
