//! Utility modules shared by the pipeline stages.

pub mod date;
pub mod html;
pub mod path;
mod plural;
pub mod slug;

pub use plural::plural_count;
