//! Data transfer objects (DTOs) for API responses.
//!
//! - `commit`: CommitInfo
//! - `blame`: BlameResponse, BlameGroupInfo

pub mod blame;
pub mod commit;

pub use blame::*;
pub use commit::*;
