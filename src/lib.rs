//! Note-taking core library
//!
//! This library owns a newest-first collection of short text/Markdown notes
//! and the active visual theme, both persisted through a small synchronous
//! key-value store.

mod boundary;
mod cli;
mod config;
mod errors;
mod helper;
mod markdown;
mod note;
mod repository;
mod store;
mod theme;
mod theme_state;
mod types;

// Re-export key components
pub use boundary::*;
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use markdown::*;
pub use note::*;
pub use repository::*;
pub use store::*;
pub use theme::*;
pub use theme_state::*;
pub use types::*;
