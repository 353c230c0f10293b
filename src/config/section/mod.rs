//! Configuration section definitions, one module per `quire.toml` table.

mod build;
mod content;
mod feed;
mod links;
mod markup;
mod site;
mod template;

pub use build::BuildSectionConfig;
pub use content::{ContentRoot, StaticConfig};
pub(crate) use content::validate_relative_dir;
pub use feed::FeedConfig;
pub use links::{LinkMode, LinkStyle, LinksConfig};
pub use markup::{MarkupConfig, MarkupExtension};
pub use site::SiteInfoConfig;
pub use template::TemplateConfig;
