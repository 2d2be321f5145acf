//! Directory tree rebuilt from a shell session log.
//!
//! Nodes live in an arena owned by [`ResourceTree`] and refer to each other by
//! [`NodeId`]. Directory sizes are aggregated lazily and memoized until the
//! next mutation below them.

mod listing;
mod query;
mod size;
mod tree;

pub use listing::Listing;
pub use query::{DepthFirstDirectories, NoMatchError};
pub use size::Size;
pub use tree::{Node, NodeId, NodeKind, NodeRef, ROOT_NAME, ResourceTree, TreeError};
