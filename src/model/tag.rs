use serde::{Deserialize, Serialize};

/// What kind of library a tag groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagType {
    #[default]
    Document,
    Prompt,
    Profile,
    ChatContext,
}

impl TagType {
    pub fn as_str(self) -> &'static str {
        match self {
            TagType::Document => "document",
            TagType::Prompt => "prompt",
            TagType::Profile => "profile",
            TagType::ChatContext => "chat_context",
        }
    }

    /// Parse a type name as written on the command line or in config
    pub fn parse_type(s: &str) -> Option<TagType> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "document" | "documents" | "doc" => Some(TagType::Document),
            "prompt" | "prompts" => Some(TagType::Prompt),
            "profile" | "profiles" | "template" | "templates" => Some(TagType::Profile),
            "chat_context" | "context" => Some(TagType::ChatContext),
            _ => None,
        }
    }
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled grouping with a slash-delimited logical location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    /// Leaf segment name
    pub name: String,
    /// Ancestor path (`a/b`), empty for root-level tags
    #[serde(default)]
    pub path: Option<String>,
    #[serde(rename = "type", default)]
    pub tag_type: TagType,
    /// Members directly tagged with this tag
    #[serde(default)]
    pub item_ids: Vec<String>,
}

impl Tag {
    pub fn new(id: &str, name: &str, path: Option<&str>, tag_type: TagType) -> Self {
        Tag {
            id: id.to_string(),
            name: name.to_string(),
            path: path.map(|p| p.to_string()),
            tag_type,
            item_ids: Vec::new(),
        }
    }

    /// Builder-style helper to attach member ids
    pub fn with_items<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.item_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// The tag without its member list, as remembered by a selection
    pub fn context(&self) -> Tag {
        Tag::new(&self.id, &self.name, self.path.as_deref(), self.tag_type)
    }
}

/// Tags are the same selection context when their ids match
impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tag {}
