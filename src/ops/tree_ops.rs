use crate::model::tag::{Tag, TagType};
use crate::model::tree::TreeNode;
use crate::parse::{normalize, segments_of};

/// Fold a flat tag list into a folder tree.
///
/// Each tag lands on the node at its full path, creating intermediate
/// folders on demand. Tags that share a full path share a node. Tags
/// without a usable name are skipped.
pub fn build_tree(tags: &[Tag]) -> TreeNode {
    let mut root = TreeNode::root();

    for tag in tags {
        let Some(segments) = segments_of(tag) else {
            tracing::debug!(tag_id = %tag.id, "skipping tag without a usable name");
            continue;
        };

        let mut node = &mut root;
        for (i, segment) in segments.iter().enumerate() {
            node = node
                .children
                .entry(segment.clone())
                .or_insert_with(|| TreeNode {
                    name: segment.clone(),
                    full: segments[..=i].join("/"),
                    ..TreeNode::default()
                });
        }
        node.tags_here.push(tag.clone());
    }

    root
}

/// Build the tree for one library type only
pub fn build_tree_for(tags: &[Tag], ty: TagType) -> TreeNode {
    let filtered: Vec<Tag> = tags.iter().filter(|t| t.tag_type == ty).cloned().collect();
    build_tree(&filtered)
}

/// Find a node by its full path. `""` (or `/`) is the root.
pub fn find_node<'a>(root: &'a TreeNode, full: &str) -> Option<&'a TreeNode> {
    let full = normalize(full);
    if full.is_empty() {
        return Some(root);
    }
    let mut node = root;
    for segment in full.split('/') {
        node = node.children.get(segment)?;
    }
    Some(node)
}
