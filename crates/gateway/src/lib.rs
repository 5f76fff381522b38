//! HTTP surface for courier: liveness, health and on-demand flush.

pub mod server;
pub mod state;

pub use {
    server::{LIVENESS_TEXT, build_app, serve, serve_on},
    state::AppState,
};
