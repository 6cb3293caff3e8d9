pub mod path;

pub use path::{full_path, normalize, segments_of, split_full, tag_segments};
