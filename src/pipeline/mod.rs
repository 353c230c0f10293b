//! Post-render processing of complete pages.
//!
//! Runs after every page and synthetic page exists, so the path table is
//! complete.

pub mod link;

pub use link::{LinkRewriter, PathMap, encode_path};
