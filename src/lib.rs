#![allow(clippy::enum_variant_names)]
//! Rebuilds a directory tree from a recorded shell session (`$ cd`, `$ ls` and
//! the listing lines they print) and answers size queries over it.
//!
//! ```
//! use dirlog::filesystem::Size;
//! use dirlog::interpreter::build;
//!
//! let tree = build(["$ cd /", "dir a", "100 f1", "$ cd a", "50 f2", "$ cd .."]);
//! assert_eq!(tree.aggregate_size(tree.root()), Size::new(150));
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod filesystem;
pub mod interpreter;
