//! Line attribution (blame) for git repositories, with ignored revisions,
//! pagination and an HTTP API.

pub mod blame;
pub mod config;
pub mod error;
pub mod git;
pub mod models;
pub mod routes;
