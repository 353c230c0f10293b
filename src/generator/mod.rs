//! Auxiliary files generated from the site graph.

pub mod feed;
