//! Completion-sync engine
//!
//! When a user checks off a checklist item, the completed item's text
//! is propagated into every note connected through a sync-eligible
//! edge: bidirectional links, and completion-sync links with auto-sync
//! enabled. Propagation is strictly additive — synced lines are never
//! removed or deduplicated, so re-syncing the same item appends it
//! again.

use crate::config;
use crate::content;
use crate::database::Repository;
use crate::error::{AppError, Result};
use crate::events::{EventBus, NoteAction, NoteEvent};
use chrono::Utc;
use serde::Serialize;

/// What a sync pass did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// Completed items found in the source content
    pub completed_items: usize,
    /// Targets whose content was updated
    pub targets_updated: usize,
    /// Targets skipped because the note no longer exists
    pub targets_skipped: usize,
}

/// Service propagating completed checklist items across linked notes
#[derive(Clone)]
pub struct SyncService {
    repo: Repository,
    events: EventBus,
}

impl SyncService {
    pub fn new(repo: Repository, events: EventBus) -> Self {
        Self { repo, events }
    }

    /// Propagate the completed checklist items of `source_content` to
    /// every sync-eligible connection of the source note.
    ///
    /// A target that no longer exists is skipped with a log; the
    /// remaining targets still sync. Each updated target is announced
    /// with a `ContentSynced` event so open views can refresh.
    pub async fn sync_completed_items(
        &self,
        user_id: &str,
        source_note_id: &str,
        source_content: &str,
    ) -> Result<SyncOutcome> {
        let mut outcome = SyncOutcome::default();

        let targets = self.repo.list_sync_targets(user_id, source_note_id).await?;
        if targets.is_empty() {
            tracing::debug!("Note {} has no sync-eligible connections", source_note_id);
            return Ok(outcome);
        }

        let items = content::extract_completed_items(source_content)?;
        if items.is_empty() {
            tracing::debug!("Note {} has no completed items to sync", source_note_id);
            return Ok(outcome);
        }
        outcome.completed_items = items.len();

        let stamp = Utc::now().format(config::SYNC_TIMESTAMP_FORMAT).to_string();

        for connection in &targets {
            let target_id = connection.partner_id.as_str();

            let note = match self.repo.get_note(user_id, target_id).await {
                Ok(note) => note,
                Err(AppError::NoteNotFound(_)) => {
                    tracing::warn!(
                        "Sync target {} of note {} no longer exists, skipping",
                        target_id,
                        source_note_id
                    );
                    outcome.targets_skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let mut updated_content = note.content;
            for item in &items {
                updated_content.push_str(&format!(
                    "\n<p>✓ {} (added {})</p>",
                    content::escape_text(item),
                    stamp
                ));
            }

            // The target may vanish between the read and the write;
            // treat that the same as a missing target.
            match self
                .repo
                .update_note_content(user_id, target_id, &updated_content)
                .await
            {
                Ok(()) => {}
                Err(AppError::NoteNotFound(_)) => {
                    outcome.targets_skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            }

            self.events.publish(
                NoteEvent::new(NoteAction::ContentSynced, user_id, target_id)
                    .with_content(updated_content),
            );

            outcome.targets_updated += 1;
        }

        tracing::info!(
            "Synced {} completed items from note {} to {} targets ({} skipped)",
            outcome.completed_items,
            source_note_id,
            outcome.targets_updated,
            outcome.targets_skipped
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_database, ConnectionType, CreateNoteRequest, Note};
    use sqlx::sqlite::SqlitePoolOptions;

    const USER: &str = "user-1";

    const CHECKED_MILK: &str =
        r#"<ul data-type="taskList"><li data-type="taskItem" data-checked="true">Buy milk</li></ul>"#;

    async fn create_test_service() -> SyncService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        SyncService::new(Repository::new(pool), EventBus::default())
    }

    async fn seed_note(service: &SyncService, title: &str) -> Note {
        service
            .repo
            .create_note(
                USER,
                CreateNoteRequest {
                    title: title.to_string(),
                    content: "<p>existing</p>".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }

    async fn link(
        service: &SyncService,
        source: &Note,
        target: &Note,
        connection_type: ConnectionType,
        auto_sync: bool,
    ) {
        service
            .repo
            .link_notes(USER, &source.id, &target.id, connection_type, auto_sync)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_propagates_to_bidirectional_target() {
        let service = create_test_service().await;

        let source = seed_note(&service, "Source").await;
        let target = seed_note(&service, "Target").await;
        link(&service, &source, &target, ConnectionType::Bidirectional, true).await;

        let outcome = service
            .sync_completed_items(USER, &source.id, CHECKED_MILK)
            .await
            .unwrap();

        assert_eq!(outcome.completed_items, 1);
        assert_eq!(outcome.targets_updated, 1);
        assert_eq!(outcome.targets_skipped, 0);

        let synced = service.repo.get_note(USER, &target.id).await.unwrap();
        assert!(synced.content.starts_with("<p>existing</p>"));
        assert!(synced.content.contains("✓ Buy milk (added "));
    }

    #[tokio::test]
    async fn test_reference_edge_receives_nothing() {
        let service = create_test_service().await;

        let source = seed_note(&service, "Source").await;
        let target = seed_note(&service, "Target").await;
        link(&service, &source, &target, ConnectionType::Reference, true).await;

        let outcome = service
            .sync_completed_items(USER, &source.id, CHECKED_MILK)
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::default());

        let untouched = service.repo.get_note(USER, &target.id).await.unwrap();
        assert_eq!(untouched.content, "<p>existing</p>");
    }

    #[tokio::test]
    async fn test_muted_completion_sync_edge_receives_nothing() {
        let service = create_test_service().await;

        let source = seed_note(&service, "Source").await;
        let target = seed_note(&service, "Target").await;
        link(&service, &source, &target, ConnectionType::CompletionSync, false).await;

        let outcome = service
            .sync_completed_items(USER, &source.id, CHECKED_MILK)
            .await
            .unwrap();

        assert_eq!(outcome.targets_updated, 0);
    }

    #[tokio::test]
    async fn test_resync_appends_again() {
        let service = create_test_service().await;

        let source = seed_note(&service, "Source").await;
        let target = seed_note(&service, "Target").await;
        link(&service, &source, &target, ConnectionType::CompletionSync, true).await;

        service
            .sync_completed_items(USER, &source.id, CHECKED_MILK)
            .await
            .unwrap();
        service
            .sync_completed_items(USER, &source.id, CHECKED_MILK)
            .await
            .unwrap();

        let synced = service.repo.get_note(USER, &target.id).await.unwrap();
        assert_eq!(synced.content.matches("✓ Buy milk").count(), 2);
    }

    #[tokio::test]
    async fn test_missing_target_skipped_others_sync() {
        let service = create_test_service().await;

        let source = seed_note(&service, "Source").await;
        let gone = seed_note(&service, "Gone").await;
        let alive = seed_note(&service, "Alive").await;
        link(&service, &source, &gone, ConnectionType::Bidirectional, true).await;
        link(&service, &source, &alive, ConnectionType::Bidirectional, true).await;

        service.repo.hard_delete_note(USER, &gone.id).await.unwrap();

        let outcome = service
            .sync_completed_items(USER, &source.id, CHECKED_MILK)
            .await
            .unwrap();

        assert_eq!(outcome.targets_updated, 1);
        assert_eq!(outcome.targets_skipped, 1);

        let synced = service.repo.get_note(USER, &alive.id).await.unwrap();
        assert!(synced.content.contains("✓ Buy milk"));
    }

    #[tokio::test]
    async fn test_no_completed_items_is_noop() {
        let service = create_test_service().await;

        let source = seed_note(&service, "Source").await;
        let target = seed_note(&service, "Target").await;
        link(&service, &source, &target, ConnectionType::Bidirectional, true).await;

        let outcome = service
            .sync_completed_items(
                USER,
                &source.id,
                r#"<li data-checked="false">Still pending</li>"#,
            )
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::default());
    }

    #[tokio::test]
    async fn test_item_text_is_escaped_into_target() {
        let service = create_test_service().await;

        let source = seed_note(&service, "Source").await;
        let target = seed_note(&service, "Target").await;
        link(&service, &source, &target, ConnectionType::Bidirectional, true).await;

        service
            .sync_completed_items(
                USER,
                &source.id,
                r#"<li data-checked="true">Salt &amp; pepper</li>"#,
            )
            .await
            .unwrap();

        let synced = service.repo.get_note(USER, &target.id).await.unwrap();
        assert!(synced.content.contains("✓ Salt &amp; pepper (added "));
    }

    #[tokio::test]
    async fn test_emits_content_synced_event() {
        let service = create_test_service().await;
        let mut rx = service.events.subscribe();

        let source = seed_note(&service, "Source").await;
        let target = seed_note(&service, "Target").await;
        link(&service, &source, &target, ConnectionType::Bidirectional, true).await;

        service
            .sync_completed_items(USER, &source.id, CHECKED_MILK)
            .await
            .unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.action, NoteAction::ContentSynced);
        assert_eq!(event.note_id, target.id);
        assert!(event.content.unwrap().contains("✓ Buy milk"));
    }
}
