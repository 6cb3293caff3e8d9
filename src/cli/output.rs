use std::collections::BTreeSet;

use serde::Serialize;

use crate::io::session_store::PersistedCtx;
use crate::model::item::Item;
use crate::model::tag::Tag;
use crate::model::tree::TreeNode;
use crate::ops::aggregate::{count_node, direct_items, get_children};
use crate::ops::library_ops::{BulkSummary, Notice};
use crate::ops::selection::{FolderState, Selection};
use crate::parse::full_path;
use crate::util::unicode::truncate_to_width;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct FolderJson {
    pub name: String,
    pub full: String,
    pub tag_ids: Vec<String>,
    pub count: usize,
    pub state: FolderState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FolderJson>,
}

#[derive(Serialize)]
pub struct ItemJson {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

#[derive(Serialize)]
pub struct ListingJson {
    pub folder: String,
    pub folders: Vec<FolderJson>,
    pub items: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct BrowseJson {
    pub folder: String,
    pub items: Vec<ItemJson>,
    pub loaded: usize,
    pub total: usize,
}

#[derive(Serialize)]
pub struct SelectionEntryJson {
    pub item_id: String,
    pub tag_id: String,
    pub folder: String,
}

#[derive(Serialize)]
pub struct BulkJson<'a> {
    pub action: &'a str,
    #[serde(flatten)]
    pub summary: &'a BulkSummary,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Folder with its whole subtree
pub fn folder_to_json(
    node: &TreeNode,
    items: &[Item],
    selection: &Selection,
    expanded: Option<&BTreeSet<String>>,
) -> FolderJson {
    FolderJson {
        name: node.name.clone(),
        full: node.full.clone(),
        tag_ids: node.tags_here.iter().map(|t| t.id.clone()).collect(),
        count: count_node(node).total,
        state: selection.folder_state(node, items),
        expanded: expanded.map(|e| e.contains(&node.full)),
        children: get_children(node)
            .into_iter()
            .map(|c| folder_to_json(c, items, selection, expanded))
            .collect(),
    }
}

/// Folder without its children
pub fn folder_summary_json(node: &TreeNode, items: &[Item], selection: &Selection) -> FolderJson {
    FolderJson {
        name: node.name.clone(),
        full: node.full.clone(),
        tag_ids: node.tags_here.iter().map(|t| t.id.clone()).collect(),
        count: count_node(node).total,
        state: selection.folder_state(node, items),
        expanded: None,
        children: Vec::new(),
    }
}

/// Whether `item` is selected under one of the folder's tags
pub fn selected_here(node: &TreeNode, item: &Item, selection: &Selection) -> bool {
    selection
        .tag_for(&item.id)
        .is_some_and(|t| node.tags_here.contains(t))
}

pub fn item_to_json(item: &Item, selected: bool) -> ItemJson {
    ItemJson {
        id: item.id.clone(),
        name: item.name.clone(),
        selected,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Options for rendering the tree
pub struct TreeView<'a> {
    pub items: &'a [Item],
    pub selection: &'a Selection,
    pub expanded: &'a BTreeSet<String>,
    /// Ignore `expanded` and open everything
    pub show_all: bool,
    /// Items to flag with `*`
    pub is_match: Option<&'a dyn Fn(&Item) -> bool>,
    pub max_width: usize,
}

impl TreeView<'_> {
    fn is_open(&self, node: &TreeNode) -> bool {
        self.show_all || self.expanded.contains(&node.full)
    }
}

/// One line for a folder: `▾ [-] Payroll (3)`
pub fn format_folder_line(node: &TreeNode, view: &TreeView<'_>, indent: usize) -> String {
    let has_content = !node.children.is_empty() || !direct_items(node, view.items).is_empty();
    let arrow = match (has_content, view.is_open(node)) {
        (false, _) => ' ',
        (true, true) => '▾',
        (true, false) => '▸',
    };
    let marker = view.selection.folder_state(node, view.items).marker();
    format!(
        "{}{} {} {} ({})",
        "  ".repeat(indent),
        arrow,
        marker,
        truncate_to_width(&node.name, view.max_width),
        count_node(node).total
    )
}

/// One line for an item: `[x] Salary bands (d2)`
pub fn format_item_line(item: &Item, selected: bool, flagged: bool, indent: usize, max_width: usize) -> String {
    let name = if item.name.is_empty() {
        item.id.as_str()
    } else {
        item.name.as_str()
    };
    format!(
        "{}{} {} ({}){}",
        "  ".repeat(indent),
        if selected { "[x]" } else { "[ ]" },
        truncate_to_width(name, max_width),
        item.id,
        if flagged { " *" } else { "" }
    )
}

/// Render every visible folder below `root`
pub fn format_tree(root: &TreeNode, view: &TreeView<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    for child in get_children(root) {
        format_subtree(child, view, 0, &mut lines);
    }
    lines
}

fn format_subtree(node: &TreeNode, view: &TreeView<'_>, indent: usize, lines: &mut Vec<String>) {
    lines.push(format_folder_line(node, view, indent));
    if !view.is_open(node) {
        return;
    }
    for child in get_children(node) {
        format_subtree(child, view, indent + 1, lines);
    }
    for item in direct_items(node, view.items) {
        let flagged = view.is_match.is_some_and(|m| m(item));
        lines.push(format_item_line(
            item,
            selected_here(node, item, view.selection),
            flagged,
            indent + 1,
            view.max_width,
        ));
    }
}

/// Describe where a selection entry lives
pub fn tag_location(tag: &Tag) -> String {
    full_path(tag.path.as_deref(), &tag.name)
}

pub fn format_selection(selection: &Selection) -> Vec<String> {
    if selection.is_empty() {
        return vec!["nothing selected".to_string()];
    }
    selection
        .entries()
        .map(|(item_id, tag)| format!("{}  under {} ({})", item_id, tag_location(tag), tag.id))
        .collect()
}

pub fn format_bulk(action: &str, summary: &BulkSummary) -> String {
    if summary.already_gone > 0 {
        format!(
            "{}: {} applied, {} already gone",
            action, summary.applied, summary.already_gone
        )
    } else {
        format!("{}: {} applied", action, summary.applied)
    }
}

pub fn format_notice(notice: &Notice) -> String {
    match &notice.detail {
        Some(d) => format!("{} ({})", notice.summary, d),
        None => notice.summary.clone(),
    }
}

fn join_or_dash(v: &[String]) -> String {
    if v.is_empty() {
        "-".to_string()
    } else {
        v.join(", ")
    }
}

pub fn format_ctx(session: &str, ctx: &PersistedCtx) -> Vec<String> {
    let mut lines = vec![
        format!("session:   {}", session),
        format!("libraries: {}", join_or_dash(&ctx.library_ids)),
        format!("prompts:   {}", join_or_dash(&ctx.prompt_ids)),
        format!("templates: {}", join_or_dash(&ctx.template_ids)),
        format!("policy:    {}", ctx.search_policy.as_str()),
    ];
    if let Some(at) = ctx.saved_at {
        lines.push(format!("saved:     {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    lines
}
