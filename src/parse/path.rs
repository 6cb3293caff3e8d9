use crate::model::tag::Tag;

/// Full slash-joined location of a tag: `path/name`, or just `name` when
/// the path is missing or blank.
pub fn full_path(path: Option<&str>, name: &str) -> String {
    match path {
        Some(p) if !p.trim().is_empty() => format!("{}/{}", p, name),
        _ => name.to_string(),
    }
}

/// Split a tag's location into non-empty segments.
///
/// Empty components (double, leading or trailing slashes) are dropped.
/// Returns `None` when the tag has no usable name, in which case the tag
/// is left out of the tree.
pub fn tag_segments(path: Option<&str>, name: &str) -> Option<Vec<String>> {
    if split_full(name.trim()).is_empty() {
        return None;
    }
    let segments = split_full(&full_path(path, name));
    if segments.is_empty() {
        return None;
    }
    Some(segments)
}

/// Segments for a tag record
pub fn segments_of(tag: &Tag) -> Option<Vec<String>> {
    tag_segments(tag.path.as_deref(), &tag.name)
}

/// Split a full path on `/`, discarding empty components
pub fn split_full(full: &str) -> Vec<String> {
    full.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Normalize a user-supplied folder path (`/HR//Payroll/` → `HR/Payroll`)
pub fn normalize(full: &str) -> String {
    split_full(full).join("/")
}
