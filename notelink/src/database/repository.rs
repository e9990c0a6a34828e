//! Repository layer for database operations
//!
//! This module provides CRUD operations for all entities. Notes are
//! addressed by `(user_id, note_id)`; every query is user-scoped.
//! Link and unlink write both ledger rows inside one transaction.

use super::models::*;
use crate::config;
use crate::error::{AppError, Result};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Select list for notes with the derived connection count.
///
/// `total_connections` is computed from the ledger on every read, so
/// it can never drift from the actual connection rows.
const NOTE_SELECT: &str = r#"
    SELECT n.*,
           (SELECT COUNT(*) FROM note_connections c WHERE c.note_id = n.id) AS total_connections
    FROM notes n
"#;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Notes =====

    /// Create a new note
    pub async fn create_note(&self, user_id: &str, req: CreateNoteRequest) -> Result<Note> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO notes (id, user_id, title, content, color, collection_id, tags, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.color.as_deref().unwrap_or(config::DEFAULT_NOTE_COLOR))
        .bind(req.collection_id.as_deref())
        .bind(Json(req.tags))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Created note: {}", id);
        self.get_note(user_id, &id).await
    }

    /// Get a note by ID
    pub async fn get_note(&self, user_id: &str, id: &str) -> Result<Note> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "{NOTE_SELECT} WHERE n.id = ? AND n.user_id = ? AND n.deleted_at IS NULL"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NoteNotFound(id.to_string()))?;

        Ok(note)
    }

    /// List all notes for a user (non-deleted)
    pub async fn list_notes(&self, user_id: &str) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            "{NOTE_SELECT} WHERE n.user_id = ? AND n.deleted_at IS NULL ORDER BY n.updated_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    /// List notes in a specific collection
    pub async fn list_notes_in_collection(
        &self,
        user_id: &str,
        collection_id: &str,
    ) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            "{NOTE_SELECT} WHERE n.user_id = ? AND n.collection_id = ? AND n.deleted_at IS NULL ORDER BY n.updated_at DESC"
        ))
        .bind(user_id)
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    /// List notes without a collection
    pub async fn list_uncategorized_notes(&self, user_id: &str) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            "{NOTE_SELECT} WHERE n.user_id = ? AND n.collection_id IS NULL AND n.deleted_at IS NULL ORDER BY n.updated_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    /// Update a note
    pub async fn update_note(&self, user_id: &str, req: UpdateNoteRequest) -> Result<Note> {
        let now = Utc::now();

        // Build dynamic update query
        let mut query = "UPDATE notes SET updated_at = ?".to_string();
        let mut params: Vec<String> = vec![now.to_rfc3339()];

        if let Some(title) = &req.title {
            query.push_str(", title = ?");
            params.push(title.clone());
        }

        if let Some(content) = &req.content {
            query.push_str(", content = ?");
            params.push(content.clone());
        }

        if let Some(color) = &req.color {
            query.push_str(", color = ?");
            params.push(color.clone());
        }

        if let Some(tags) = &req.tags {
            query.push_str(", tags = ?");
            params.push(serde_json::to_string(tags)?);
        }

        // SQLite's integer affinity stores "1"/"0" as integers
        if let Some(is_starred) = req.is_starred {
            query.push_str(", is_starred = ?");
            params.push(if is_starred { "1" } else { "0" }.to_string());
        }

        if let Some(is_archived) = req.is_archived {
            query.push_str(", is_archived = ?");
            params.push(if is_archived { "1" } else { "0" }.to_string());
        }

        query.push_str(" WHERE id = ? AND user_id = ? AND deleted_at IS NULL");
        params.push(req.id.clone());
        params.push(user_id.to_string());

        // Execute update
        let mut q = sqlx::query(&query);
        for param in &params {
            q = q.bind(param);
        }

        let rows_affected = q.execute(&self.pool).await?.rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NoteNotFound(req.id));
        }

        // Fetch updated note
        self.get_note(user_id, &req.id).await
    }

    /// Replace a note's content (completion-sync write path)
    pub async fn update_note_content(
        &self,
        user_id: &str,
        id: &str,
        content: &str,
    ) -> Result<()> {
        let now = Utc::now();

        let rows = sqlx::query(
            r#"
            UPDATE notes SET content = ?, updated_at = ?
            WHERE id = ? AND user_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(content)
        .bind(now)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(AppError::NoteNotFound(id.to_string()));
        }

        Ok(())
    }

    /// Move a note into a collection (or out of any collection)
    pub async fn update_note_collection(
        &self,
        user_id: &str,
        note_id: &str,
        collection_id: Option<&str>,
    ) -> Result<Note> {
        let now = Utc::now();

        let rows = sqlx::query(
            r#"
            UPDATE notes SET collection_id = ?, updated_at = ?
            WHERE id = ? AND user_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(collection_id)
        .bind(now)
        .bind(note_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(AppError::NoteNotFound(note_id.to_string()));
        }

        self.get_note(user_id, note_id).await
    }

    /// Set or clear a note's password hash.
    /// The note is private exactly while a hash is present.
    pub async fn set_note_password(
        &self,
        user_id: &str,
        note_id: &str,
        password_hash: Option<&str>,
    ) -> Result<()> {
        let now = Utc::now();

        let rows = sqlx::query(
            r#"
            UPDATE notes SET password_hash = ?, is_private = ?, updated_at = ?
            WHERE id = ? AND user_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(password_hash)
        .bind(password_hash.is_some())
        .bind(now)
        .bind(note_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(AppError::NoteNotFound(note_id.to_string()));
        }

        Ok(())
    }

    /// Soft delete a note
    pub async fn delete_note(&self, user_id: &str, id: &str) -> Result<()> {
        let now = Utc::now();

        let rows = sqlx::query(
            r#"
            UPDATE notes SET deleted_at = ? WHERE id = ? AND user_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(now)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(AppError::NoteNotFound(id.to_string()));
        }

        tracing::debug!("Soft deleted note: {}", id);
        Ok(())
    }

    /// Permanently delete a note. The ledger rows owned by the note go
    /// with it (FK cascade); partners' rows pointing at it remain as
    /// dangling weak references.
    pub async fn hard_delete_note(&self, user_id: &str, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Hard deleted note: {}", id);
        Ok(())
    }

    // ===== Collections =====

    /// Create a new collection
    pub async fn create_collection(
        &self,
        user_id: &str,
        req: CreateCollectionRequest,
    ) -> Result<Collection> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let collection = sqlx::query_as::<_, Collection>(
            r#"
            INSERT INTO collections (id, user_id, name, description, color, icon, sort_order, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&req.name)
        .bind(req.description.as_deref())
        .bind(req.color.as_deref())
        .bind(req.icon.as_deref())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created collection: {}", id);
        Ok(collection)
    }

    /// Get a collection by ID
    pub async fn get_collection(&self, user_id: &str, id: &str) -> Result<Collection> {
        let collection = sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::CollectionNotFound(id.to_string()))?;

        Ok(collection)
    }

    /// List all collections for a user
    pub async fn list_collections(&self, user_id: &str) -> Result<Vec<Collection>> {
        let collections = sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections WHERE user_id = ? ORDER BY sort_order ASC, name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(collections)
    }

    /// Update a collection
    pub async fn update_collection(
        &self,
        user_id: &str,
        req: UpdateCollectionRequest,
    ) -> Result<Collection> {
        let now = Utc::now();

        let mut query = "UPDATE collections SET updated_at = ?".to_string();
        let mut params: Vec<String> = vec![now.to_rfc3339()];

        if let Some(name) = &req.name {
            query.push_str(", name = ?");
            params.push(name.clone());
        }

        if let Some(description) = &req.description {
            query.push_str(", description = ?");
            params.push(description.clone());
        }

        if let Some(color) = &req.color {
            query.push_str(", color = ?");
            params.push(color.clone());
        }

        if let Some(icon) = &req.icon {
            query.push_str(", icon = ?");
            params.push(icon.clone());
        }

        if let Some(sort_order) = req.sort_order {
            query.push_str(", sort_order = ?");
            params.push(sort_order.to_string());
        }

        query.push_str(" WHERE id = ? AND user_id = ?");
        params.push(req.id.clone());
        params.push(user_id.to_string());

        let mut q = sqlx::query(&query);
        for param in &params {
            q = q.bind(param);
        }

        let rows_affected = q.execute(&self.pool).await?.rows_affected();

        if rows_affected == 0 {
            return Err(AppError::CollectionNotFound(req.id));
        }

        self.get_collection(user_id, &req.id).await
    }

    /// Delete a collection. Notes inside it become uncategorized
    /// (FK ON DELETE SET NULL).
    pub async fn delete_collection(&self, user_id: &str, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM collections WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::CollectionNotFound(id.to_string()));
        }

        tracing::debug!("Deleted collection: {}", id);
        Ok(())
    }

    /// Count notes in a collection
    pub async fn count_notes_in_collection(
        &self,
        user_id: &str,
        collection_id: &str,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM notes
            WHERE user_id = ? AND collection_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(collection_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    // ===== Connection ledger =====

    /// Link two notes. Writes the forward and reverse ledger rows in
    /// one transaction; either both land or neither does.
    ///
    /// The ledger is a set keyed by `(note_id, partner_id)`: relinking
    /// an already-linked pair updates the edge type and sync flags in
    /// place instead of duplicating rows.
    pub async fn link_notes(
        &self,
        user_id: &str,
        source_id: &str,
        target_id: &str,
        connection_type: ConnectionType,
        auto_sync: bool,
    ) -> Result<()> {
        if source_id == target_id {
            return Err(AppError::Validation(
                "cannot link a note to itself".to_string(),
            ));
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Both endpoints must exist for this user
        for id in [source_id, target_id] {
            let exists: Option<i32> = sqlx::query_scalar(
                "SELECT 1 FROM notes WHERE id = ? AND user_id = ? AND deleted_at IS NULL",
            )
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

            if exists.is_none() {
                return Err(AppError::NoteNotFound(id.to_string()));
            }
        }

        // The reverse edge never syncs on its own: a bidirectional
        // link mirrors its type, anything else becomes a reference.
        let reverse_type = match connection_type {
            ConnectionType::Bidirectional => ConnectionType::Bidirectional,
            _ => ConnectionType::Reference,
        };
        let sync_completed_items = connection_type == ConnectionType::CompletionSync;

        let upsert = r#"
            INSERT INTO note_connections (note_id, partner_id, connection_type, auto_sync, sync_completed_items, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(note_id, partner_id) DO UPDATE SET
                connection_type = excluded.connection_type,
                auto_sync = excluded.auto_sync,
                sync_completed_items = excluded.sync_completed_items
        "#;

        sqlx::query(upsert)
            .bind(source_id)
            .bind(target_id)
            .bind(connection_type)
            .bind(auto_sync)
            .bind(sync_completed_items)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        sqlx::query(upsert)
            .bind(target_id)
            .bind(source_id)
            .bind(reverse_type)
            .bind(false)
            .bind(false)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE notes SET updated_at = ? WHERE id IN (?, ?)")
            .bind(now)
            .bind(source_id)
            .bind(target_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!("Linked notes {} <-> {}", source_id, target_id);
        Ok(())
    }

    /// Remove the link between two notes, both directions, in one
    /// transaction. Missing notes or a missing link are a no-op:
    /// users may unlink stale references to already-deleted notes.
    ///
    /// Returns whether any ledger row was actually removed.
    pub async fn unlink_notes(
        &self,
        user_id: &str,
        source_id: &str,
        target_id: &str,
    ) -> Result<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM note_connections
            WHERE ((note_id = ? AND partner_id = ?) OR (note_id = ? AND partner_id = ?))
              AND note_id IN (SELECT id FROM notes WHERE user_id = ?)
            "#,
        )
        .bind(source_id)
        .bind(target_id)
        .bind(target_id)
        .bind(source_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed > 0 {
            sqlx::query("UPDATE notes SET updated_at = ? WHERE id IN (?, ?) AND user_id = ?")
                .bind(now)
                .bind(source_id)
                .bind(target_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        if removed > 0 {
            tracing::debug!("Unlinked notes {} <-> {}", source_id, target_id);
        }
        Ok(removed > 0)
    }

    /// List the raw ledger entries for a note
    pub async fn list_connections(
        &self,
        user_id: &str,
        note_id: &str,
    ) -> Result<Vec<NoteConnection>> {
        let connections = sqlx::query_as::<_, NoteConnection>(
            r#"
            SELECT c.* FROM note_connections c
            JOIN notes n ON n.id = c.note_id AND n.user_id = ?
            WHERE c.note_id = ?
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(note_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(connections)
    }

    /// Resolve a note's connections to the partner notes themselves.
    /// Connections whose partner is missing or deleted are skipped,
    /// not errors: `partner_id` is a weak reference.
    pub async fn get_connected_notes(&self, user_id: &str, note_id: &str) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT n.*,
                   (SELECT COUNT(*) FROM note_connections c2 WHERE c2.note_id = n.id) AS total_connections
            FROM note_connections c
            JOIN notes n ON n.id = c.partner_id AND n.user_id = ? AND n.deleted_at IS NULL
            WHERE c.note_id = ?
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(note_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    /// Ledger entries of a note that are eligible for completion sync:
    /// bidirectional edges, or completion-sync edges with auto-sync on.
    pub async fn list_sync_targets(
        &self,
        user_id: &str,
        note_id: &str,
    ) -> Result<Vec<NoteConnection>> {
        let connections = sqlx::query_as::<_, NoteConnection>(
            r#"
            SELECT c.* FROM note_connections c
            JOIN notes n ON n.id = c.note_id AND n.user_id = ? AND n.deleted_at IS NULL
            WHERE c.note_id = ?
              AND (c.connection_type = 'bidirectional'
                   OR (c.connection_type = 'completion-sync' AND c.auto_sync = 1))
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(note_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(connections)
    }

    // ===== Settings =====

    /// Get a per-user setting
    pub async fn get_setting(&self, user_id: &str, key: &str) -> Result<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM user_settings WHERE user_id = ? AND key = ?")
                .bind(user_id)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Set a per-user setting
    pub async fn set_setting(&self, user_id: &str, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_settings (user_id, key, value) VALUES (?, ?, ?)
            ON CONFLICT(user_id, key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(user_id)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Set setting: {} = {}", key, value);
        Ok(())
    }
}
