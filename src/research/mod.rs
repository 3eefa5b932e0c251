//! Research paper summarization: PDF text extraction, cleanup, chunked
//! abstractive summary and key-point selection.

mod dto;
pub mod extract;
pub mod handlers;
pub mod repo;
mod repo_types;
pub mod services;
pub mod text;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
