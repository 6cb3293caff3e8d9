use std::collections::BTreeSet;

use regex::Regex;

use crate::model::item::Item;
use crate::model::tree::TreeNode;
use crate::ops::aggregate::{direct_items, walk};

/// Does the item's name or id match the query
pub fn item_matches(item: &Item, re: &Regex) -> bool {
    re.is_match(&item.name) || re.is_match(&item.id)
}

/// Compile a user query for case-insensitive matching
pub fn compile_query(query: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?i){}", query))
}

/// True when an item directly under `node`, or anywhere below it,
/// satisfies `predicate`.
pub fn node_has_match<F>(node: &TreeNode, items: &[Item], predicate: &F) -> bool
where
    F: Fn(&Item) -> bool,
{
    if direct_items(node, items).into_iter().any(predicate) {
        return true;
    }
    node.children
        .values()
        .any(|child| node_has_match(child, items, predicate))
}

/// Folders to open so every match is visible: each non-root folder that
/// has a match at or below it. The root is always open and never listed.
pub fn auto_expand<F>(root: &TreeNode, items: &[Item], predicate: &F) -> BTreeSet<String>
where
    F: Fn(&Item) -> bool,
{
    walk(root)
        .into_iter()
        .filter(|(_, node)| node_has_match(node, items, predicate))
        .map(|(_, node)| node.full.clone())
        .collect()
}

/// Recompute the expanded set after the query or item list changed.
///
/// While a query is active the result replaces `current` entirely, so
/// manual expand/collapse is dropped. With no query `current` is kept.
pub fn recompute_expanded(
    current: &BTreeSet<String>,
    root: &TreeNode,
    items: &[Item],
    query: Option<&Regex>,
) -> BTreeSet<String> {
    match query {
        Some(re) => auto_expand(root, items, &|item: &Item| item_matches(item, re)),
        None => current.clone(),
    }
}
