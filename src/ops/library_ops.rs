use serde::Serialize;

use crate::model::tag::{Tag, TagType};
use crate::model::tree::TreeNode;
use crate::ops::aggregate::collect_descendant_tags;
use crate::ops::api::{Action, ApiError, LibraryApi, Permissions, Resource};
use crate::ops::selection::Selection;

/// Error type for library mutations
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("nothing selected")]
    EmptySelection,
    #[error("folder has no tag to act on: {0}")]
    NoTag(String),
    #[error("not permitted: {0}")]
    NotPermitted(String),
    #[error("{context}: {source}")]
    Api { context: String, source: ApiError },
}

/// A user-facing message, the terminal stand-in for a toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LibraryError {
    pub fn notice(&self) -> Notice {
        match self {
            LibraryError::NotPermitted(what) => Notice {
                summary: "You are not allowed to do this".to_string(),
                detail: Some(what.clone()),
            },
            LibraryError::Api { context, source } => Notice {
                summary: format!("{} failed", context),
                detail: Some(match &source.detail {
                    Some(d) => format!("{}: {}", source.summary, d),
                    None => source.summary.clone(),
                }),
            },
            other => Notice {
                summary: other.to_string(),
                detail: None,
            },
        }
    }
}

/// Outcome of a bulk mutation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    /// Calls that took effect
    pub applied: usize,
    /// Targets that were already gone (404)
    pub already_gone: usize,
}

/// Which resource an item of a library type is
pub fn resource_for(ty: TagType) -> Resource {
    match ty {
        TagType::Document | TagType::ChatContext => Resource::Document,
        TagType::Prompt => Resource::Prompt,
        TagType::Profile => Resource::Profile,
    }
}

fn classify(context: &str, err: ApiError) -> LibraryError {
    if err.is_forbidden() {
        LibraryError::NotPermitted(context.to_string())
    } else {
        LibraryError::Api {
            context: context.to_string(),
            source: err,
        }
    }
}

/// Remove every selected item from the tag it was selected under.
///
/// A 404 counts as already removed. The selection is cleared only when
/// every call succeeded, so a failed run can simply be retried.
pub fn remove_selected<A, P>(
    api: &mut A,
    perms: &P,
    selection: &mut Selection,
) -> Result<BulkSummary, LibraryError>
where
    A: LibraryApi + ?Sized,
    P: Permissions + ?Sized,
{
    if selection.is_empty() {
        return Err(LibraryError::EmptySelection);
    }
    for (_, tag) in selection.entries() {
        if !perms.can(Action::Update, Resource::Tag)
            || !perms.can(Action::Delete, resource_for(tag.tag_type))
        {
            return Err(LibraryError::NotPermitted(format!(
                "remove items from {}",
                tag.name
            )));
        }
    }

    let mut summary = BulkSummary::default();
    for (item_id, tag) in selection.entries() {
        match api.remove_item(&tag.id, item_id) {
            Ok(()) => summary.applied += 1,
            Err(e) if e.is_not_found() => {
                tracing::debug!(item_id, tag_id = %tag.id, "already removed");
                summary.already_gone += 1;
            }
            Err(e) => {
                tracing::warn!(item_id, tag_id = %tag.id, error = %e, "remove failed");
                return Err(classify("Remove from library", e));
            }
        }
    }
    selection.clear();
    Ok(summary)
}

/// Add every selected item to `target`, clearing the selection on success
pub fn share_selected<A, P>(
    api: &mut A,
    perms: &P,
    selection: &mut Selection,
    target: &Tag,
) -> Result<BulkSummary, LibraryError>
where
    A: LibraryApi + ?Sized,
    P: Permissions + ?Sized,
{
    if selection.is_empty() {
        return Err(LibraryError::EmptySelection);
    }
    if !perms.can(Action::Update, Resource::Tag)
        || !perms.can(Action::Create, resource_for(target.tag_type))
    {
        return Err(LibraryError::NotPermitted(format!("add items to {}", target.name)));
    }

    let mut summary = BulkSummary::default();
    for (item_id, _) in selection.entries() {
        api.add_item(&target.id, item_id)
            .map_err(|e| classify("Share", e))?;
        summary.applied += 1;
    }
    selection.clear();
    Ok(summary)
}

/// Delete every tag in a folder's subtree. Tags that are already gone are
/// counted, not reported.
pub fn delete_folder<A, P>(api: &mut A, perms: &P, node: &TreeNode) -> Result<BulkSummary, LibraryError>
where
    A: LibraryApi + ?Sized,
    P: Permissions + ?Sized,
{
    if !perms.can(Action::Delete, Resource::Tag) {
        return Err(LibraryError::NotPermitted(format!("delete folder {}", node.full)));
    }
    let tags = collect_descendant_tags(node);
    if tags.is_empty() {
        return Err(LibraryError::NoTag(node.full.clone()));
    }

    let mut summary = BulkSummary::default();
    for tag in tags {
        match api.delete_tag(&tag.id) {
            Ok(()) => summary.applied += 1,
            Err(e) if e.is_not_found() => summary.already_gone += 1,
            Err(e) => return Err(classify("Delete folder", e)),
        }
    }
    Ok(summary)
}
