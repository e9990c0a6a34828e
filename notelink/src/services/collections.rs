//! Collections service
//!
//! CRUD operations for collections/folders to organize notes.

use crate::config;
use crate::database::{Collection, CreateCollectionRequest, Repository, UpdateCollectionRequest};
use crate::error::{AppError, Result};

/// Service for managing collections
#[derive(Clone)]
pub struct CollectionsService {
    repo: Repository,
}

impl CollectionsService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a new collection
    pub async fn create_collection(
        &self,
        user_id: &str,
        req: CreateCollectionRequest,
    ) -> Result<Collection> {
        tracing::info!("Creating collection: {}", req.name);

        validate_name(&req.name)?;
        if let Some(color) = &req.color {
            if !config::VALID_NOTE_COLORS.contains(&color.as_str()) {
                return Err(AppError::Validation(format!("Invalid color: {}", color)));
            }
        }

        let collection = self.repo.create_collection(user_id, req).await?;

        tracing::info!("Collection created: {}", collection.id);
        Ok(collection)
    }

    /// Get a collection by ID
    pub async fn get_collection(&self, user_id: &str, id: &str) -> Result<Collection> {
        self.repo.get_collection(user_id, id).await
    }

    /// List all collections for a user
    pub async fn list_collections(&self, user_id: &str) -> Result<Vec<Collection>> {
        self.repo.list_collections(user_id).await
    }

    /// Update a collection
    pub async fn update_collection(
        &self,
        user_id: &str,
        req: UpdateCollectionRequest,
    ) -> Result<Collection> {
        tracing::info!("Updating collection: {}", req.id);

        if let Some(name) = &req.name {
            validate_name(name)?;
        }

        self.repo.update_collection(user_id, req).await
    }

    /// Delete a collection. Its notes become uncategorized.
    pub async fn delete_collection(&self, user_id: &str, id: &str) -> Result<()> {
        tracing::info!("Deleting collection: {}", id);
        self.repo.delete_collection(user_id, id).await
    }

    /// Count notes in a collection
    pub async fn count_notes(&self, user_id: &str, collection_id: &str) -> Result<i64> {
        self.repo.count_notes_in_collection(user_id, collection_id).await
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "Collection name cannot be empty".to_string(),
        ));
    }
    if name.len() > config::MAX_COLLECTION_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "Collection name exceeds {} characters",
            config::MAX_COLLECTION_NAME_LENGTH
        )));
    }
    Ok(())
}
