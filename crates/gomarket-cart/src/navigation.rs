//! # Navigation
//!
//! The floating cart only knows *that* it should open the cart screen, not
//! how. The host app supplies a [`Navigator`].

use std::sync::Mutex;
use tracing::info;

/// Route name of the full cart screen.
pub const CART_DESTINATION: &str = "Cart";

/// Moves the host app to a named screen.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: &str);
}

/// Remembers every destination it was sent to.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destinations in the order they were requested.
    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, destination: &str) {
        self.visited
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(destination.to_string());
    }
}

/// Logs navigation requests; for hosts without screens (the CLI).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, destination: &str) {
        info!(destination = %destination, "Navigation requested");
    }
}
