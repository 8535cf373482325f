//! Toast notifications.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Default lifetime of a toast.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

/// Lifetime of error toasts raised by the desk.
pub const ERROR_DURATION: Duration = Duration::from_millis(5000);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    /// Zero keeps the toast until it is removed.
    pub duration: Duration,
    pub created: Instant,
}

impl Toast {
    pub fn is_sticky(&self) -> bool {
        self.duration.is_zero()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        !self.is_sticky() && now.saturating_duration_since(self.created) >= self.duration
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    toasts: Vec<Toast>,
}

/// Queue of toasts currently on screen.
#[derive(Debug, Default)]
pub struct Toasts {
    inner: Mutex<Inner>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a toast and return its id.
    pub fn show(&self, kind: ToastKind, message: impl Into<String>, duration: Duration) -> u64 {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.next_id += 1;
        let id = inner.next_id;
        inner.toasts.push(Toast {
            id,
            kind,
            message: message.into(),
            duration,
            created: Instant::now(),
        });
        id
    }

    pub fn success(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.show(ToastKind::Success, message, duration.unwrap_or(DEFAULT_DURATION))
    }

    pub fn error(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.show(ToastKind::Error, message, duration.unwrap_or(DEFAULT_DURATION))
    }

    pub fn warning(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.show(ToastKind::Warning, message, duration.unwrap_or(DEFAULT_DURATION))
    }

    pub fn info(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.show(ToastKind::Info, message, duration.unwrap_or(DEFAULT_DURATION))
    }

    pub fn remove(&self, id: u64) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let before = inner.toasts.len();
        inner.toasts.retain(|t| t.id != id);
        inner.toasts.len() != before
    }

    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .toasts
            .clear();
    }

    /// Drop expired toasts and return the rest, oldest first.
    pub fn active(&self, now: Instant) -> Vec<Toast> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.toasts.retain(|t| !t.is_expired(now));
        inner.toasts.clone()
    }
}
