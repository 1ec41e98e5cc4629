//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the shared,
//! immutable resources every webhook request reads from.

use responder_core::handler::CallHandler;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub call_handler: Arc<CallHandler>,
}

impl AppState {
    pub fn new(call_handler: CallHandler) -> Self {
        Self {
            call_handler: Arc::new(call_handler),
        }
    }
}
