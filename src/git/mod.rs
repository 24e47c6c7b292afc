pub mod blame;
pub mod files;
pub mod history;
pub mod repository;

pub use files::TreeFiles;
pub use history::GitHistory;
pub use repository::{GitRepository, SharedRepo};
