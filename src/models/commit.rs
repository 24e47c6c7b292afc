use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub oid: String,
    pub summary: String,
    pub author: String,
    pub author_email: String,
    pub timestamp: i64,
    pub relative_time: String,
}
