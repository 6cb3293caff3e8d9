pub mod aggregate;
pub mod api;
pub mod browse;
pub mod library_ops;
pub mod search;
pub mod selection;
pub mod tree_ops;
