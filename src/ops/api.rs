//! Seams to the backend: the REST client and the permission oracle are
//! opaque collaborators, expressed here as traits so a local catalog or a
//! test double can stand in for them.

use serde_json::Value;

use crate::model::item::ItemPage;

const GENERIC_SUMMARY: &str = "request failed";

/// A failed backend call, with whatever the error payload told us
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{summary}{}", .detail.as_deref().map(|d| format!(": {}", d)).unwrap_or_default())]
pub struct ApiError {
    /// HTTP-style status, when there was a response at all
    pub status: Option<u16>,
    pub summary: String,
    pub detail: Option<String>,
}

impl ApiError {
    pub fn new(status: Option<u16>, summary: &str) -> Self {
        ApiError {
            status,
            summary: summary.to_string(),
            detail: None,
        }
    }

    pub fn not_found(what: &str) -> Self {
        ApiError::new(Some(404), &format!("{} not found", what))
    }

    pub fn forbidden(what: &str) -> Self {
        ApiError::new(Some(403), &format!("{} is not permitted", what))
    }

    /// Build from a status and a JSON error body.
    ///
    /// Looks for `summary`/`detail`, then `message`/`error`, then a string
    /// body; falls back to a generic summary.
    pub fn from_payload(status: Option<u16>, body: &Value) -> Self {
        let field = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
        let summary = field("summary")
            .or_else(|| field("message"))
            .or_else(|| field("error"))
            .or_else(|| body.as_str().map(str::to_string))
            .unwrap_or_else(|| GENERIC_SUMMARY.to_string());
        let detail = field("detail").or_else(|| {
            // FastAPI-style `{"detail": [{"msg": ...}]}`
            body.get("detail")
                .and_then(Value::as_array)
                .and_then(|a| a.first())
                .and_then(|e| e.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        ApiError {
            status,
            summary,
            detail,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status == Some(403)
    }
}

/// The "browse items by tag" query
pub trait ItemSource {
    /// One page of items carrying any of `tag_ids`
    fn fetch_page(&self, tag_ids: &[String], offset: usize, limit: usize)
    -> Result<ItemPage, ApiError>;
}

/// Tag membership mutations
pub trait LibraryApi {
    fn remove_item(&mut self, tag_id: &str, item_id: &str) -> Result<(), ApiError>;
    fn add_item(&mut self, tag_id: &str, item_id: &str) -> Result<(), ApiError>;
    fn delete_tag(&mut self, tag_id: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Tag,
    Document,
    Prompt,
    Profile,
}

/// Permission oracle
pub trait Permissions {
    fn can(&self, action: Action, resource: Resource) -> bool;
}

/// Allows everything
pub struct AllowAll;

impl Permissions for AllowAll {
    fn can(&self, _action: Action, _resource: Resource) -> bool {
        true
    }
}
