//! Transport-facing pieces: the HTTP server and the tool/resource/prompt catalog

pub mod catalog;
pub mod http;

pub use http::{create_router, start_server, AppState};
