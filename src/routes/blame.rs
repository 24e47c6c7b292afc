//! Blame endpoint.
//!
//! GET /api/v1/repository/blame?path=<path>&commit=<optional>
//!     &page=<n>&no_pagination=<bool>&streaming=<bool>
//!     &ignore_revs=<bool>&start=<line>&end=<line>
//!
//! Returns attribution for a file at a commit, folded into groups of
//! consecutive lines sharing a commit. Large files are paginated unless
//! `no_pagination` is set; `start`/`end` select an explicit line span.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::AppState;
use crate::blame::RangeRequest;
use crate::error::{AppError, Result};
use crate::models::BlameResponse;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repository/blame", get(get_blame))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct BlameQuery {
    path: String,
    commit: Option<String>,
    page: Option<u32>,
    #[serde(default)]
    no_pagination: bool,
    #[serde(default)]
    streaming: bool,
    #[serde(default)]
    ignore_revs: bool,
    start: Option<u32>,
    end: Option<u32>,
}

impl BlameQuery {
    fn range_request(&self) -> Result<RangeRequest> {
        let lines = match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            (None, None) => None,
            _ => {
                return Err(AppError::InvalidQuery(
                    "start and end must be given together".to_string(),
                ))
            }
        };

        Ok(RangeRequest {
            no_pagination: self.no_pagination,
            streaming: self.streaming,
            page: self.page,
            lines,
        })
    }
}

async fn get_blame(
    State(state): State<AppState>,
    Query(query): Query<BlameQuery>,
) -> Result<Json<BlameResponse>> {
    let request = query.range_request()?;
    let repo = state
        .repo
        .read()
        .map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
    let response = repo.get_blame(
        &query.path,
        query.commit.as_deref(),
        &request,
        query.ignore_revs,
        &state.config,
    )?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlameConfig;
    use crate::git::test_support::{create_commit, init_temp_repo};
    use crate::git::GitRepository;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::{Arc, RwLock};

    fn state(path: &std::path::Path, config: BlameConfig) -> AppState {
        let repo = GitRepository::open(path).unwrap();
        AppState {
            repo: Arc::new(RwLock::new(repo)),
            config,
        }
    }

    fn query(path: &str) -> BlameQuery {
        BlameQuery {
            path: path.to_string(),
            commit: None,
            page: None,
            no_pagination: false,
            streaming: false,
            ignore_revs: false,
            start: None,
            end: None,
        }
    }

    #[test]
    fn test_query_to_range_request() {
        let full = BlameQuery {
            page: Some(2),
            streaming: true,
            start: Some(3),
            end: Some(9),
            ..query("a")
        };
        let request = full.range_request().unwrap();
        assert_eq!(request.lines, Some((3, 9)));
        assert_eq!(request.page, Some(2));
        assert!(request.streaming);

        let half = BlameQuery { end: None, ..full };
        assert!(matches!(half.range_request(), Err(AppError::InvalidQuery(_))));
    }

    #[tokio::test]
    async fn test_blame_handler_paginates() {
        let (dir, repo) = init_temp_repo();
        create_commit(&repo, "root", &[("a.txt", "1\n2\n3\n4\n5\n")], None);
        let config = BlameConfig {
            page_size: 2,
            pagination_threshold: 3,
        };

        let Json(page) = get_blame(
            State(state(dir.path(), config)),
            Query(BlameQuery { page: Some(2), ..query("a.txt") }),
        )
        .await
        .unwrap();
        let body = serde_json::to_value(&page).unwrap();
        assert_eq!(body["mode"]["kind"], "paginated");
        assert_eq!(body["mode"]["page"], 2);
        assert_eq!(body["start_line"], 3);
        assert_eq!(body["end_line"], 4);
        assert_eq!(body["groups"][0]["commit"]["summary"], "root");
        assert!(body.get("ignore_revs_error").is_none());

        let Json(full) = get_blame(
            State(state(dir.path(), config)),
            Query(BlameQuery { no_pagination: true, ..query("a.txt") }),
        )
        .await
        .unwrap();
        let body = serde_json::to_value(&full).unwrap();
        assert_eq!(body["mode"]["kind"], "full");
        assert_eq!(body["end_line"], 5);
    }

    #[tokio::test]
    async fn test_blame_handler_errors() {
        let (dir, repo) = init_temp_repo();
        create_commit(&repo, "root", &[("a.txt", "1\n2\n")], None);

        let err = get_blame(
            State(state(dir.path(), BlameConfig::default())),
            Query(BlameQuery { start: Some(1), end: Some(7), ..query("a.txt") }),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("1-7"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = get_blame(State(state(dir.path(), BlameConfig::default())), Query(query("nope.txt")))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
