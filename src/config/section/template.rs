//! `[template]` section configuration.
//!
//! ```toml
//! [template.defaults]
//! author = "Anonymous"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Fallback values for fields a template references but a context
    /// does not supply.
    pub defaults: BTreeMap<String, String>,
}
