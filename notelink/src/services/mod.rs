//! Services module
//!
//! Business logic services that coordinate between the UI layer and
//! the repository. This is the crate's public surface:
//! - `notes`: Note lifecycle, organization and private-note passwords
//! - `collections`: Collection/folder operations
//! - `links`: The note-to-note connection ledger
//! - `sync`: Completion sync across linked notes
//! - `settings`: Per-user preferences

pub mod collections;
pub mod links;
pub mod notes;
pub mod settings;
pub mod sync;

pub use collections::CollectionsService;
pub use links::NoteLinksService;
pub use notes::NotesService;
pub use settings::{SettingsService, UserPreferences};
pub use sync::{SyncOutcome, SyncService};
