//! Database models
//!
//! Rust structs representing database entities.
//! All models use serde for serialization to frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A note with rich text content
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// HTML-like rich text markup produced by the editor
    pub content: String,
    pub color: String,
    pub collection_id: Option<String>,
    pub tags: Json<Vec<String>>,
    pub is_starred: bool,
    pub is_archived: bool,
    pub is_private: bool,
    /// Argon2id PHC string, present only for private notes.
    /// Never sent to the frontend.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    /// Derived from the connection ledger at read time
    pub total_connections: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create note request
#[derive(Debug, Default, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub color: Option<String>,
    pub collection_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Update note request
#[derive(Debug, Default, Deserialize)]
pub struct UpdateNoteRequest {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_starred: Option<bool>,
    pub is_archived: Option<bool>,
}

/// Collection/folder for organizing notes
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Collection {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create collection request
#[derive(Debug, Default, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Update collection request
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCollectionRequest {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
}

/// How one note is connected to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum ConnectionType {
    /// Plain pointer to the partner note
    Reference,
    /// Content flows both ways between the endpoints
    Bidirectional,
    /// Completed checklist items flow from this side to the partner
    CompletionSync,
}

/// One edge of the connection ledger.
///
/// Every link between two notes is stored as exactly two rows, one per
/// endpoint. `partner_id` is a weak reference: the partner may have
/// been deleted, so it must be resolved defensively at read time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NoteConnection {
    pub note_id: String,
    pub partner_id: String,
    pub connection_type: ConnectionType,
    pub auto_sync: bool,
    pub sync_completed_items: bool,
    pub created_at: DateTime<Utc>,
}
