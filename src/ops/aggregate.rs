use std::collections::HashSet;

use serde::Serialize;

use crate::model::item::Item;
use crate::model::tag::Tag;
use crate::model::tree::TreeNode;
use crate::util::unicode::collate_cmp;

/// Unique member count for a set of tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocCount {
    pub total: usize,
    /// Member ids in first-seen order
    pub ids: Vec<String>,
}

/// Child folders in human name order
pub fn get_children(node: &TreeNode) -> Vec<&TreeNode> {
    let mut children: Vec<&TreeNode> = node.children.values().collect();
    children.sort_by(|a, b| collate_cmp(&a.name, &b.name));
    children
}

/// All tags in the subtree rooted at `node` (inclusive), depth-first
pub fn collect_descendant_tags(node: &TreeNode) -> Vec<&Tag> {
    let mut out = Vec::new();
    collect_into(node, &mut out);
    out
}

fn collect_into<'a>(node: &'a TreeNode, out: &mut Vec<&'a Tag>) {
    out.extend(node.tags_here.iter());
    for child in get_children(node) {
        collect_into(child, out);
    }
}

/// Count members across `tags`, counting an item tagged twice only once
pub fn count_docs_unique<'a, I>(tags: I) -> DocCount
where
    I: IntoIterator<Item = &'a Tag>,
{
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for tag in tags {
        for id in &tag.item_ids {
            if seen.insert(id.as_str()) {
                ids.push(id.clone());
            }
        }
    }
    DocCount {
        total: ids.len(),
        ids,
    }
}

/// Unique member count for a whole folder
pub fn count_node(node: &TreeNode) -> DocCount {
    count_docs_unique(collect_descendant_tags(node))
}

/// Items carrying one of the tags that end exactly at `node`
pub fn direct_items<'a>(node: &TreeNode, items: &'a [Item]) -> Vec<&'a Item> {
    items
        .iter()
        .filter(|item| node.tags_here.iter().any(|t| item.carries(&t.id)))
        .collect()
}

/// Items carrying any tag in the subtree, each listed once, in input order
pub fn subtree_items<'a>(node: &TreeNode, items: &'a [Item]) -> Vec<&'a Item> {
    let tag_ids: HashSet<&str> = collect_descendant_tags(node)
        .into_iter()
        .map(|t| t.id.as_str())
        .collect();
    items
        .iter()
        .filter(|item| item.tag_ids.iter().any(|id| tag_ids.contains(id.as_str())))
        .collect()
}

/// Pre-order listing of every folder below `root` with its depth
/// (top-level folders are depth 0), children in `get_children` order.
pub fn walk(root: &TreeNode) -> Vec<(usize, &TreeNode)> {
    let mut out = Vec::new();
    for child in get_children(root) {
        walk_into(child, 0, &mut out);
    }
    out
}

fn walk_into<'a>(node: &'a TreeNode, depth: usize, out: &mut Vec<(usize, &'a TreeNode)>) {
    out.push((depth, node));
    for child in get_children(node) {
        walk_into(child, depth + 1, out);
    }
}
