//! User-visible notifications.
//!
//! Fetch failures never reach the caller as errors; they are reported
//! out-of-band through a [`Notifier`], the way a web front end raises a toast.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Message shown when a fetch fails on the wire or the backend rejects it.
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error, please try again later";

/// Message shown when a fetch needs a login first.
pub const AUTH_REQUIRED_MESSAGE: &str = "Authentication required, please log in again";

const DEFAULT_NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single toast-style notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Text to show.
    pub message: String,
    /// Severity (affects styling).
    pub level: NoticeLevel,
    /// How long the host should keep it on screen.
    pub duration: Duration,
}

impl Notice {
    /// Create an info notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(message, NoticeLevel::Info)
    }

    /// Create a success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(message, NoticeLevel::Success)
    }

    /// Create a warning notice.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(message, NoticeLevel::Warning)
    }

    /// Create an error notice. Errors stay up longer.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            duration: Duration::from_secs(5),
            ..Self::with_level(message, NoticeLevel::Error)
        }
    }

    fn with_level(message: impl Into<String>, level: NoticeLevel) -> Self {
        Self {
            message: message.into(),
            level,
            duration: DEFAULT_NOTICE_DURATION,
        }
    }

    /// Override the display duration.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Sink for user-visible notices.
pub trait Notifier: Send + Sync {
    /// Shows `notice` to the user.
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log instead of showing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => log::error!("{}", notice.message),
            NoticeLevel::Warning => log::warn!("{}", notice.message),
            NoticeLevel::Info | NoticeLevel::Success => log::info!("{}", notice.message),
        }
    }
}

/// Collects notices until the host drains and renders them.
#[derive(Debug, Default)]
pub struct NoticeQueue {
    notices: Mutex<VecDeque<Notice>>,
}

impl NoticeQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every pending notice, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        self.lock().drain(..).collect()
    }

    /// Returns the number of pending notices.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notice>> {
        self.notices.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Notifier for NoticeQueue {
    fn notify(&self, notice: Notice) {
        self.lock().push_back(notice);
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice)
    }
}
