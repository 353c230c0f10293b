//! Core types shared across the pipeline stages.

mod error;
mod link;

pub use error::{BuildError, Failure};
#[cfg(test)]
pub use error::ErrorKind;
pub use link::LinkKind;
