//! List query configuration.

use serde::{Deserialize, Serialize};

use crate::types::pagination::{DEFAULT_LIMIT, MAX_LIMIT};

/// Defaults applied to list queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Page size used when a caller passes a limit of zero.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Upper bound for caller supplied limits.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_LIMIT,
            max_page_size: MAX_LIMIT,
        }
    }
}

fn default_page_size() -> u64 {
    DEFAULT_LIMIT
}

fn default_max_page_size() -> u64 {
    MAX_LIMIT
}
