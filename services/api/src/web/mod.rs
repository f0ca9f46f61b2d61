pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

// Re-export the REST handlers to make them easily accessible to the
// binary that builds the web server router.
pub use middleware::require_auth;
pub use rest::{
    delete_history_handler, get_history_handler, list_history_handler, summarize_handler,
    upload_handler,
};
