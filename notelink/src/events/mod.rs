//! In-process event notifications
//!
//! Mutations to notes publish `NoteEvent`s on an `EventBus` so that any
//! open view of an affected note can refresh. Events are transient:
//! there is no durability or replay, and nothing is buffered for
//! subscribers that connect later.

pub mod bus;
pub mod types;

pub use bus::EventBus;
pub use types::{NoteAction, NoteEvent};
