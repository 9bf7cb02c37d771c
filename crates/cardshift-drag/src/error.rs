#![forbid(unsafe_code)]

//! Error types for the drag engine.
//!
//! Layout math cannot fail. Only the calls into the host can, and the
//! controller never lets those escape: it turns them into a [`DragError`],
//! shows the host a [`UserMessage`], and still tears the session down.

use std::fmt;

/// Broad category of a host failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostErrorKind {
    /// The host no longer knows the item.
    NotFound,
    /// The host refused the request (read-only board, invalid link, ...).
    Rejected,
    /// Storage or another backend could not be reached.
    Unavailable,
    Other,
}

impl fmt::Display for HostErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "not found",
            Self::Rejected => "rejected",
            Self::Unavailable => "unavailable",
            Self::Other => "failed",
        })
    }
}

/// Failure reported by a host callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    pub kind: HostErrorKind,
    pub message: String,
}

impl HostError {
    #[must_use]
    pub fn new(kind: HostErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::NotFound, message)
    }

    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::Rejected, message)
    }

    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::Unavailable, message)
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for HostError {}

/// Errors surfaced by the drag controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragError {
    /// No card under the pointer or at the computed position.
    InvalidDragTarget,
    /// `move_item_to_index` failed.
    OrderingMutationFailed(HostError),
    /// `link_items` failed.
    LinkFailed(HostError),
    /// `save` failed.
    SaveFailed(HostError),
    /// The session refers to a card the host no longer reports.
    StaleSessionState,
}

impl DragError {
    /// Message to show the user, if this failure is worth showing.
    #[must_use]
    pub fn user_message(&self) -> Option<UserMessage> {
        let text = match self {
            Self::InvalidDragTarget | Self::StaleSessionState => return None,
            Self::OrderingMutationFailed(e) => format!("Could not move the card ({e})."),
            Self::LinkFailed(e) => format!("Could not link the cards ({e})."),
            Self::SaveFailed(e) => format!("The new order could not be saved ({e})."),
        };
        Some(UserMessage::error(text))
    }

    /// The host failure underneath, if any.
    #[must_use]
    pub fn host_error(&self) -> Option<&HostError> {
        match self {
            Self::OrderingMutationFailed(e) | Self::LinkFailed(e) | Self::SaveFailed(e) => Some(e),
            Self::InvalidDragTarget | Self::StaleSessionState => None,
        }
    }
}

impl fmt::Display for DragError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDragTarget => write!(f, "no card at the drag target"),
            Self::OrderingMutationFailed(e) => write!(f, "ordering mutation failed: {e}"),
            Self::LinkFailed(e) => write!(f, "link request failed: {e}"),
            Self::SaveFailed(e) => write!(f, "save failed: {e}"),
            Self::StaleSessionState => write!(f, "drag session refers to a card that is gone"),
        }
    }
}

impl std::error::Error for DragError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.host_error()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// How prominently the host should show a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A dismissible, non-fatal message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub severity: Severity,
    pub text: String,
}

impl UserMessage {
    #[must_use]
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Severity::Error, text)
    }
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
