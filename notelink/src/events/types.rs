//! Note event types for live-UI notifications

use serde::{Deserialize, Serialize};

/// The mutation that happened to a note
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteAction {
    Created,
    Updated,
    Deleted,
    Linked,
    Unlinked,
    /// Completion sync appended content to this note
    ContentSynced,
}

/// An event emitted after a successful note mutation
///
/// Consumers filter by `note_id` to refresh the views they have open.
/// Must be Clone for `tokio::sync::broadcast`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteEvent {
    /// The action performed
    pub action: NoteAction,
    /// Owner of the affected note
    pub user_id: String,
    /// The note that was mutated
    pub note_id: String,
    /// The other endpoint (for Linked/Unlinked actions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
    /// The note's new content (for ContentSynced)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// ISO 8601 timestamp
    pub timestamp: String,
}

impl NoteEvent {
    /// Create a new NoteEvent with the current timestamp
    pub fn new(action: NoteAction, user_id: impl Into<String>, note_id: impl Into<String>) -> Self {
        Self {
            action,
            user_id: user_id.into(),
            note_id: note_id.into(),
            partner_id: None,
            content: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Set the partner note (for Linked/Unlinked)
    pub fn with_partner(mut self, partner_id: impl Into<String>) -> Self {
        self.partner_id = Some(partner_id.into());
        self
    }

    /// Set the new content (for ContentSynced)
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}
