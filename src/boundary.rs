//! Top-level error boundary for the presentation layer.
//!
//! Wraps a unit of presentation work, catches any error it returns or panic
//! it raises, logs the failure and keeps a fallback report for display until
//! the boundary is reset.
use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
};

use chrono::{DateTime, Utc};
use log::error;

use crate::{NoteboxError, Result};

/// What the boundary caught.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    /// Short description of the failure
    pub message: String,
    /// Whether the failure was a panic rather than a returned error
    pub panicked: bool,
    pub occurred_at: DateTime<Utc>,
}

impl RenderFailure {
    fn from_error(err: &NoteboxError) -> Self {
        Self {
            message: err.to_string(),
            panicked: false,
            occurred_at: Utc::now(),
        }
    }

    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };

        Self {
            message,
            panicked: true,
            occurred_at: Utc::now(),
        }
    }
}

impl fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Something went wrong: {}", self.message)
    }
}

impl From<RenderFailure> for NoteboxError {
    fn from(failure: RenderFailure) -> Self {
        NoteboxError::UnhandledRenderError {
            message: failure.message,
        }
    }
}

#[derive(Default)]
pub struct ErrorBoundary {
    failure: Option<RenderFailure>,
    on_reset: Option<Box<dyn FnMut()>>,
}

impl ErrorBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a boundary that calls `on_reset` whenever it is reset.
    pub fn with_reset(on_reset: impl FnMut() + 'static) -> Self {
        Self {
            failure: None,
            on_reset: Some(Box::new(on_reset)),
        }
    }

    /// Runs `work`, returning its value, or `None` if it failed.
    ///
    /// While a failure is held the boundary shows its fallback and skips
    /// further work until [`ErrorBoundary::reset`] is called.
    pub fn run<T>(&mut self, work: impl FnOnce() -> Result<T>) -> Option<T> {
        if self.failure.is_some() {
            return None;
        }

        let failure = match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(Ok(value)) => return Some(value),
            Ok(Err(e)) => RenderFailure::from_error(&e),
            Err(payload) => RenderFailure::from_panic(payload),
        };

        error!(
            "Error boundary caught a failure at {}: {} (panic: {})",
            failure.occurred_at.to_rfc3339(),
            failure.message,
            failure.panicked
        );
        self.failure = Some(failure);
        None
    }

    pub fn has_error(&self) -> bool {
        self.failure.is_some()
    }

    pub fn failure(&self) -> Option<&RenderFailure> {
        self.failure.as_ref()
    }

    /// Text shown in place of the failed view, with the reset hint.
    pub fn fallback_message(&self) -> Option<String> {
        self.failure
            .as_ref()
            .map(|failure| format!("{}\nRun the command again to retry.", failure))
    }

    /// Clears the held failure so work can run again.
    pub fn reset(&mut self) {
        self.failure = None;
        if let Some(on_reset) = self.on_reset.as_mut() {
            on_reset();
        }
    }
}
