//! Application configuration constants
//!
//! Central location for all configuration constants, resource limits,
//! and validation boundaries used throughout the library.

// ===== Note Validation Limits =====

/// Maximum length for a note title.
/// Titles longer than this are almost certainly pasted content.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum number of tags on a single note
pub const MAX_TAGS_PER_NOTE: usize = 32;

/// Maximum length of a single tag
pub const MAX_TAG_LENGTH: usize = 64;

/// Minimum length for a private-note password
pub const MIN_PASSWORD_LENGTH: usize = 4;

// ===== Collection Validation Limits =====

/// Maximum length for a collection name
pub const MAX_COLLECTION_NAME_LENGTH: usize = 100;

// ===== Color Palette =====

/// Valid note and collection colors.
/// The UI renders these as the fixed swatch picker.
pub const VALID_NOTE_COLORS: &[&str] = &[
    "default", "red", "orange", "yellow", "green", "teal", "blue", "purple", "pink",
];

/// Color assigned when a note is created without one
pub const DEFAULT_NOTE_COLOR: &str = "default";

// ===== User Preferences =====

/// Valid UI theme values
pub const VALID_THEMES: &[&str] = &["light", "dark", "system"];

// ===== Events =====

/// Capacity of the in-process event broadcast channel.
/// Slow subscribers lag past this many buffered events.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

// ===== Database =====

/// Maximum connections in the application pool
pub const DB_MAX_CONNECTIONS: u32 = 5;

/// Busy timeout for SQLite connections in seconds
pub const DB_BUSY_TIMEOUT_SECS: u64 = 5;

// ===== Completion Sync =====

/// Timestamp format stamped onto propagated checklist items
pub const SYNC_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
