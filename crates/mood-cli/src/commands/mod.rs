//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_db, load_config) and init
//! - `analyze` - Input loading, window resolution, analysis output
//! - `insights` - Insight generation and store management
//! - `rules` - Rule listing

pub mod analyze;
pub mod core;
pub mod insights;
pub mod rules;

// Re-export command functions for main.rs
pub use analyze::*;
pub use core::*;
pub use insights::*;
pub use rules::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
