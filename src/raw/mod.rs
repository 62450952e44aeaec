mod arena;
mod handle;
mod iter;
mod node;
mod path;
mod tree;

pub(crate) use iter::RawIter;
pub(crate) use tree::RawTree;

pub use tree::{Cursor, DEFAULT_ORDER, MAX_ORDER, MIN_ORDER};
