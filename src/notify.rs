//! Collaborators injected into the tools
//!
//! Notices, ad placements and clipboard access are owned by whatever hosts
//! the tools. Each is a trait here so components can be driven without a
//! page shell, plus a tracing-backed default for the command-line front end.

use crate::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, message)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log instead of a toast area.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => {
                info!("{}: {}", notice.title, notice.message)
            }
            NoticeLevel::Warning => warn!("{}: {}", notice.title, notice.message),
            NoticeLevel::Error => error!("{}: {}", notice.title, notice.message),
        }
    }
}

/// Ad unit shapes a slot can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum AdFormat {
    Auto,
    Rectangle,
    Horizontal,
    Vertical,
}

#[cfg_attr(test, mockall::automock)]
pub trait AdSlotRenderer: Send + Sync {
    fn render(&self, slot_id: &str, format: AdFormat);
}

#[derive(Debug, Default, Clone)]
pub struct TracingAdRenderer;

impl AdSlotRenderer for TracingAdRenderer {
    fn render(&self, slot_id: &str, format: AdFormat) {
        tracing::debug!("Ad slot {} requested with format {:?}", slot_id, format);
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write(&self, text: &str) -> Result<(), ToolError>;
}

/// Keeps the last written value; stands in for the system clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write(&self, text: &str) -> Result<(), ToolError> {
        let mut guard = self
            .contents
            .lock()
            .map_err(|e| ToolError::ClipboardFailure(e.to_string()))?;
        *guard = Some(text.to_string());
        Ok(())
    }
}

/// Best-effort copy. Failures are logged and surfaced as a warning notice,
/// never returned.
pub async fn copy_to_clipboard(clipboard: &dyn Clipboard, notifier: &dyn Notifier, text: &str) -> bool {
    match clipboard.write(text).await {
        Ok(()) => {
            notifier.notify(Notice::success("Copied", "Copied to clipboard"));
            true
        }
        Err(e) => {
            warn!("Clipboard write failed: {}", e);
            notifier.notify(e.notice());
            false
        }
    }
}
