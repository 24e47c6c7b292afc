//! API route handlers - maps HTTP endpoints to git operations.
//!
//! - `blame`: per-line attribution, grouped by commit

pub mod blame;

use axum::Router;

use crate::config::BlameConfig;
use crate::git::SharedRepo;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub repo: SharedRepo,
    pub config: BlameConfig,
}

pub fn create_router(state: AppState) -> Router {
    Router::new().merge(blame::routes(state))
}
