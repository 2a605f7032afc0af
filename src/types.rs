//! Shared types for the notebox application.
//!
//! This module contains the crate-wide `Result` alias, the degraded-mode
//! notice raised when storage fails, and the CLI subcommand definitions.
use std::{fmt, path::PathBuf};

use chrono::{DateTime, Utc};
use clap::Subcommand;

use crate::NoteboxError;

/// A specialized Result type for notebox operations.
pub type Result<T> = std::result::Result<T, NoteboxError>;

/// User-visible warning raised the first time a component loses access to
/// its persisted state. After that the component keeps working in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageNotice {
    /// The store key whose read or write failed
    pub key: String,
    /// The underlying failure, for logs and diagnostics
    pub reason: String,
    /// When the failure was first observed
    pub raised_at: DateTime<Utc>,
}

impl StorageNotice {
    pub fn new(key: &str, reason: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            reason: reason.into(),
            raised_at: Utc::now(),
        }
    }
}

impl fmt::Display for StorageNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Storage is unavailable ({}); changes to '{}' are kept for this session only",
            self.reason, self.key
        )
    }
}

/// Available subcommands for the notebox application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new note
    Create {
        /// Title of the note
        #[clap(short = 'T', long, default_value = "")]
        title: String,

        /// Content of the note, can be markdown formatted
        #[clap(short, long)]
        content: Option<String>,

        /// Path to a file containing the note's content
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// Mark the note as Markdown
        #[clap(short, long)]
        markdown: bool,
    },

    /// List notes, newest first
    List {
        /// Only show notes whose title or content contains this text
        #[clap(short, long)]
        search: Option<String>,

        /// Limit the number of notes returned (0 means no limit)
        #[clap(short = 'n', long, default_value_t = 0)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show the most recently created notes
    Recent,

    /// View a note by ID
    View {
        /// ID of the note to view
        id: u64,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,

        /// Render Markdown notes as HTML
        #[clap(long)]
        html: bool,
    },

    /// Replace the content (and optionally the title) of a note
    Edit {
        /// ID of the note to edit
        id: u64,

        /// New title for the note
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content for the note
        #[clap(short, long)]
        content: Option<String>,

        /// Path to a file containing the new note content
        #[clap(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete a note by ID
    Delete {
        /// ID of the note to delete
        id: u64,
    },

    /// Delete every note
    Clear {
        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Theme operations (list, show, set)
    Theme {
        #[clap(subcommand)]
        action: ThemeCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    /// List the available themes
    List,
    /// Show the active theme
    Show,
    /// Activate a theme by name
    Set {
        /// Name of the theme (cosmic, forest, sunset)
        name: String,
    },
}
