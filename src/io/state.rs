use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::io::workspace_io::{WorkspaceError, write_json};
use crate::model::tag::TagType;
use crate::ops::selection::Selection;

pub const STATE_FILE: &str = ".state.json";

/// Browsing state kept between CLI invocations (written to .state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiState {
    /// Current selection, across all libraries
    #[serde(default)]
    pub selection: Selection,
    /// Per-library state
    #[serde(default)]
    pub libraries: HashMap<TagType, LibraryUiState>,
}

/// Per-library browsing state
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LibraryUiState {
    /// Full paths of open folders
    #[serde(default)]
    pub expanded: BTreeSet<String>,
    /// Last search query
    #[serde(default)]
    pub last_search: Option<String>,
}

impl UiState {
    pub fn library(&self, ty: TagType) -> LibraryUiState {
        self.libraries.get(&ty).cloned().unwrap_or_default()
    }

    pub fn library_mut(&mut self, ty: TagType) -> &mut LibraryUiState {
        self.libraries.entry(ty).or_default()
    }
}

/// Read .state.json; missing or unreadable state starts fresh
pub fn read_ui_state(shelf_dir: &Path) -> UiState {
    let path = shelf_dir.join(STATE_FILE);
    let Ok(content) = fs::read_to_string(&path) else {
        return UiState::default();
    };
    match serde_json::from_str(&content) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable state file");
            UiState::default()
        }
    }
}

/// Write .state.json
pub fn write_ui_state(shelf_dir: &Path, state: &UiState) -> Result<(), WorkspaceError> {
    write_json(&shelf_dir.join(STATE_FILE), state)
}
