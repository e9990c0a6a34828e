//! Notes service
//!
//! High-level business logic for note operations: lifecycle,
//! organization (colors, tags, starring, archiving, collections)
//! and private-note password management.

use crate::config;
use crate::crypto;
use crate::database::{CreateNoteRequest, Note, Repository, UpdateNoteRequest};
use crate::error::{AppError, Result};
use crate::events::{EventBus, NoteAction, NoteEvent};

/// Service for managing notes
#[derive(Clone)]
pub struct NotesService {
    repo: Repository,
    events: EventBus,
}

impl NotesService {
    pub fn new(repo: Repository, events: EventBus) -> Self {
        Self { repo, events }
    }

    /// Create a new note
    pub async fn create_note(&self, user_id: &str, req: CreateNoteRequest) -> Result<Note> {
        tracing::info!("Creating new note: {}", req.title);

        validate_title(&req.title)?;
        if let Some(color) = &req.color {
            validate_color(color)?;
        }
        validate_tags(&req.tags)?;

        // A note can only be created into a collection that exists
        if let Some(collection_id) = &req.collection_id {
            self.repo.get_collection(user_id, collection_id).await?;
        }

        let note = self.repo.create_note(user_id, req).await?;

        self.events
            .publish(NoteEvent::new(NoteAction::Created, user_id, &note.id));

        tracing::info!("Note created successfully: {}", note.id);

        Ok(note)
    }

    /// Get a note by ID
    pub async fn get_note(&self, user_id: &str, id: &str) -> Result<Note> {
        self.repo.get_note(user_id, id).await
    }

    /// List all notes for a user
    pub async fn list_notes(&self, user_id: &str) -> Result<Vec<Note>> {
        self.repo.list_notes(user_id).await
    }

    /// List notes in a specific collection
    pub async fn list_notes_in_collection(
        &self,
        user_id: &str,
        collection_id: &str,
    ) -> Result<Vec<Note>> {
        self.repo.list_notes_in_collection(user_id, collection_id).await
    }

    /// List notes without a collection
    pub async fn list_uncategorized_notes(&self, user_id: &str) -> Result<Vec<Note>> {
        self.repo.list_uncategorized_notes(user_id).await
    }

    /// Search notes by title or content
    pub async fn search_notes(&self, user_id: &str, query: &str) -> Result<Vec<Note>> {
        let all_notes = self.list_notes(user_id).await?;

        let query_lower = query.to_lowercase();

        let filtered: Vec<Note> = all_notes
            .into_iter()
            .filter(|note| {
                note.title.to_lowercase().contains(&query_lower)
                    || note.content.to_lowercase().contains(&query_lower)
            })
            .collect();

        Ok(filtered)
    }

    /// List notes carrying a tag (case-insensitive)
    pub async fn list_notes_by_tag(&self, user_id: &str, tag: &str) -> Result<Vec<Note>> {
        let all_notes = self.list_notes(user_id).await?;

        let filtered: Vec<Note> = all_notes
            .into_iter()
            .filter(|note| note.tags.0.iter().any(|t| t.eq_ignore_ascii_case(tag)))
            .collect();

        Ok(filtered)
    }

    /// Update a note. Star and archive toggles ride this path.
    pub async fn update_note(&self, user_id: &str, req: UpdateNoteRequest) -> Result<Note> {
        tracing::debug!("Updating note: {}", req.id);

        if let Some(title) = &req.title {
            validate_title(title)?;
        }
        if let Some(color) = &req.color {
            validate_color(color)?;
        }
        if let Some(tags) = &req.tags {
            validate_tags(tags)?;
        }

        let note = self.repo.update_note(user_id, req).await?;

        self.events
            .publish(NoteEvent::new(NoteAction::Updated, user_id, &note.id));

        tracing::debug!("Note updated successfully: {}", note.id);

        Ok(note)
    }

    /// Move a note into a collection, or out of any collection
    pub async fn move_to_collection(
        &self,
        user_id: &str,
        note_id: &str,
        collection_id: Option<&str>,
    ) -> Result<Note> {
        if let Some(collection_id) = collection_id {
            self.repo.get_collection(user_id, collection_id).await?;
        }

        let note = self
            .repo
            .update_note_collection(user_id, note_id, collection_id)
            .await?;

        self.events
            .publish(NoteEvent::new(NoteAction::Updated, user_id, note_id));

        Ok(note)
    }

    /// Delete a note (soft delete).
    ///
    /// Ledger rows pointing at the deleted note are left in place on
    /// purpose: partners treat them as weak references and skip them
    /// at read time, and `unlink_notes` stays available for cleanup.
    pub async fn delete_note(&self, user_id: &str, id: &str) -> Result<()> {
        tracing::info!("Deleting note: {}", id);

        self.repo.delete_note(user_id, id).await?;

        self.events
            .publish(NoteEvent::new(NoteAction::Deleted, user_id, id));

        tracing::info!("Note deleted successfully: {}", id);

        Ok(())
    }

    /// Make a note private, protected by a password
    pub async fn set_note_password(
        &self,
        user_id: &str,
        note_id: &str,
        password: &str,
    ) -> Result<()> {
        if password.len() < config::MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                config::MIN_PASSWORD_LENGTH
            )));
        }

        let hash = crypto::hash_password(password)?;
        self.repo
            .set_note_password(user_id, note_id, Some(&hash))
            .await?;

        tracing::info!("Note {} is now private", note_id);
        Ok(())
    }

    /// Remove a note's password protection. The current password must
    /// verify first.
    pub async fn clear_note_password(
        &self,
        user_id: &str,
        note_id: &str,
        password: &str,
    ) -> Result<()> {
        self.verify_note_password(user_id, note_id, password).await?;

        self.repo.set_note_password(user_id, note_id, None).await?;

        tracing::info!("Note {} is no longer private", note_id);
        Ok(())
    }

    /// Check a password against a private note.
    /// A note without password protection always verifies.
    pub async fn verify_note_password(
        &self,
        user_id: &str,
        note_id: &str,
        password: &str,
    ) -> Result<()> {
        let note = self.repo.get_note(user_id, note_id).await?;

        match &note.password_hash {
            Some(hash) if crypto::verify_password(hash, password)? => Ok(()),
            Some(_) => Err(AppError::InvalidPassword),
            None => Ok(()),
        }
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Title cannot be empty".to_string()));
    }
    if title.len() > config::MAX_TITLE_LENGTH {
        return Err(AppError::Validation(format!(
            "Title exceeds {} characters",
            config::MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<()> {
    if !config::VALID_NOTE_COLORS.contains(&color) {
        return Err(AppError::Validation(format!("Invalid color: {}", color)));
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<()> {
    if tags.len() > config::MAX_TAGS_PER_NOTE {
        return Err(AppError::Validation(format!(
            "A note can carry at most {} tags",
            config::MAX_TAGS_PER_NOTE
        )));
    }
    for tag in tags {
        if tag.trim().is_empty() || tag.len() > config::MAX_TAG_LENGTH {
            return Err(AppError::Validation(format!("Invalid tag: {:?}", tag)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_database, Repository};
    use sqlx::sqlite::SqlitePoolOptions;

    const USER: &str = "user-1";

    async fn create_test_service() -> NotesService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        let repo = Repository::new(pool);
        NotesService::new(repo, EventBus::default())
    }

    fn new_note(title: &str) -> CreateNoteRequest {
        CreateNoteRequest {
            title: title.to_string(),
            content: "<p>hello</p>".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_note() {
        let service = create_test_service().await;

        let note = service.create_note(USER, new_note("Test")).await.unwrap();

        let fetched = service.get_note(USER, &note.id).await.unwrap();

        assert_eq!(fetched.id, note.id);
        assert_eq!(fetched.title, "Test");
    }

    #[tokio::test]
    async fn test_create_emits_event() {
        let service = create_test_service().await;
        let mut rx = service.events.subscribe();

        let note = service.create_note(USER, new_note("Evented")).await.unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.action, NoteAction::Created);
        assert_eq!(event.note_id, note.id);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_color() {
        let service = create_test_service().await;

        let result = service
            .create_note(
                USER,
                CreateNoteRequest {
                    title: "Bad color".to_string(),
                    color: Some("magenta".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title_and_too_many_tags() {
        let service = create_test_service().await;

        let result = service.create_note(USER, new_note("   ")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = service
            .create_note(
                USER,
                CreateNoteRequest {
                    title: "Tagged".to_string(),
                    tags: (0..=config::MAX_TAGS_PER_NOTE)
                        .map(|i| format!("tag-{}", i))
                        .collect(),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_into_missing_collection_fails() {
        let service = create_test_service().await;

        let result = service
            .create_note(
                USER,
                CreateNoteRequest {
                    title: "Orphan".to_string(),
                    collection_id: Some("missing".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::CollectionNotFound(_))));
    }

    #[tokio::test]
    async fn test_search_notes() {
        let service = create_test_service().await;

        service.create_note(USER, new_note("Apple")).await.unwrap();
        service.create_note(USER, new_note("Banana")).await.unwrap();
        service.create_note(USER, new_note("Cherry")).await.unwrap();

        let results = service.search_notes(USER, "an").await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Banana");
    }

    #[tokio::test]
    async fn test_star_and_archive_toggles() {
        let service = create_test_service().await;

        let note = service.create_note(USER, new_note("Toggles")).await.unwrap();

        let updated = service
            .update_note(
                USER,
                UpdateNoteRequest {
                    id: note.id.clone(),
                    is_starred: Some(true),
                    is_archived: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.is_starred);
        assert!(updated.is_archived);
    }

    #[tokio::test]
    async fn test_list_notes_by_tag() {
        let service = create_test_service().await;

        service
            .create_note(
                USER,
                CreateNoteRequest {
                    title: "Groceries".to_string(),
                    tags: vec!["errands".to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        service.create_note(USER, new_note("Untagged")).await.unwrap();

        let tagged = service.list_notes_by_tag(USER, "Errands").await.unwrap();

        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].title, "Groceries");
    }

    #[tokio::test]
    async fn test_password_protect_and_verify() {
        let service = create_test_service().await;

        let note = service.create_note(USER, new_note("Secret")).await.unwrap();

        service
            .set_note_password(USER, &note.id, "hunter2")
            .await
            .unwrap();

        let fetched = service.get_note(USER, &note.id).await.unwrap();
        assert!(fetched.is_private);

        service
            .verify_note_password(USER, &note.id, "hunter2")
            .await
            .unwrap();

        let result = service.verify_note_password(USER, &note.id, "wrong").await;
        assert!(matches!(result, Err(AppError::InvalidPassword)));

        // Clearing requires the current password
        let result = service.clear_note_password(USER, &note.id, "wrong").await;
        assert!(matches!(result, Err(AppError::InvalidPassword)));

        service
            .clear_note_password(USER, &note.id, "hunter2")
            .await
            .unwrap();

        let fetched = service.get_note(USER, &note.id).await.unwrap();
        assert!(!fetched.is_private);
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let service = create_test_service().await;

        let note = service.create_note(USER, new_note("Secret")).await.unwrap();

        let result = service.set_note_password(USER, &note.id, "ab").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
