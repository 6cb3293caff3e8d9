pub mod tag;
pub mod item;
pub mod tree;
pub mod catalog;
pub mod config;

pub use tag::*;
pub use item::*;
pub use tree::*;
pub use catalog::*;
pub use config::*;
