pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use store::Store;

/// Shared request state: the storage handle injected at startup. Handlers
/// and services receive the store through this, never through a global.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}
