//! Note links service
//!
//! Maintains the connection ledger between notes. Every link is a
//! symmetric pair of ledger rows, one per endpoint, written together
//! in a single transaction by the repository. The link type decides
//! how completion sync flows (see `services::sync`).

use crate::database::{ConnectionType, Note, NoteConnection, Repository};
use crate::error::{AppError, Result};
use crate::events::{EventBus, NoteAction, NoteEvent};

/// Service for managing note-to-note connections
#[derive(Clone)]
pub struct NoteLinksService {
    repo: Repository,
    events: EventBus,
}

impl NoteLinksService {
    pub fn new(repo: Repository, events: EventBus) -> Self {
        Self { repo, events }
    }

    /// Link two notes.
    ///
    /// The source side carries `connection_type` and `auto_sync` as
    /// given; the target side gets a `bidirectional` edge when the link
    /// is bidirectional, otherwise a plain `reference`, never
    /// auto-syncing. Sync therefore flows source → target only, unless
    /// the link is bidirectional.
    ///
    /// Relinking an already-linked pair updates the edge in place; it
    /// never duplicates ledger rows.
    pub async fn link_notes(
        &self,
        user_id: &str,
        source_note_id: &str,
        target_note_id: &str,
        connection_type: ConnectionType,
        auto_sync: bool,
    ) -> Result<()> {
        tracing::info!(
            "Linking notes {} -> {} ({:?})",
            source_note_id,
            target_note_id,
            connection_type
        );

        self.repo
            .link_notes(user_id, source_note_id, target_note_id, connection_type, auto_sync)
            .await?;

        self.events.publish(
            NoteEvent::new(NoteAction::Linked, user_id, source_note_id)
                .with_partner(target_note_id),
        );

        Ok(())
    }

    /// Remove the link between two notes.
    ///
    /// Lenient by design: if either note or the link itself is gone,
    /// this returns without error so users can clear stale references
    /// to already-deleted notes.
    pub async fn unlink_notes(
        &self,
        user_id: &str,
        source_note_id: &str,
        target_note_id: &str,
    ) -> Result<()> {
        let removed = self
            .repo
            .unlink_notes(user_id, source_note_id, target_note_id)
            .await?;

        if removed {
            tracing::info!("Unlinked notes {} -> {}", source_note_id, target_note_id);
            self.events.publish(
                NoteEvent::new(NoteAction::Unlinked, user_id, source_note_id)
                    .with_partner(target_note_id),
            );
        }

        Ok(())
    }

    /// The notes connected to a note.
    ///
    /// Connections whose partner no longer exists are skipped. A
    /// missing note yields an empty list, not an error.
    pub async fn get_connected_notes(&self, user_id: &str, note_id: &str) -> Result<Vec<Note>> {
        match self.repo.get_note(user_id, note_id).await {
            Ok(_) => self.repo.get_connected_notes(user_id, note_id).await,
            Err(AppError::NoteNotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// The raw ledger entries of a note, for the connections panel
    pub async fn list_connections(
        &self,
        user_id: &str,
        note_id: &str,
    ) -> Result<Vec<NoteConnection>> {
        self.repo.list_connections(user_id, note_id).await
    }
}
