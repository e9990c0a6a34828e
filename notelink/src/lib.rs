//! notelink library
//!
//! Backend core for a personal note-taking application: note and
//! collection storage, organization metadata (colors, tags, starring,
//! archiving, private notes), the note-linking ledger, and the
//! completion-sync engine that propagates checked-off checklist items
//! between linked notes. The UI layer consumes this crate through the
//! `services` module and subscribes to `events` for live refresh.

pub mod config;
pub mod content;
pub mod crypto;
pub mod database;
pub mod error;
pub mod events;
pub mod services;
