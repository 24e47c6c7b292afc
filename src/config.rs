//! Per-deployment blame settings.
//!
//! Page size and the pagination threshold are fixed for the life of the
//! process; the binary fills them from CLI flags or the environment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_PAGINATION_THRESHOLD: u32 = 1000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlameConfig {
    /// Lines per page in paginated and streaming modes.
    pub page_size: u32,
    /// Files with more lines than this paginate unless told otherwise.
    pub pagination_threshold: u32,
}

impl Default for BlameConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            pagination_threshold: DEFAULT_PAGINATION_THRESHOLD,
        }
    }
}

impl BlameConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(self)
    }
}
