//! Conversation history persistence
//!
//! Stores the full set of conversations as a single JSON snapshot in an
//! embedded `sled` database. Every save rewrites the snapshot in one
//! write, and a missing or unreadable snapshot loads as an empty history
//! so the client always starts up.

use crate::error::{PalaverError, Result};
use chrono::Utc;
use directories::ProjectDirs;
use sled::Db;
use std::path::Path;
use tracing::warn;

pub mod types;
pub use types::{new_conversation_id, new_message_id, Conversation, Message, MessageRole};

/// Key under which the full conversation snapshot is stored.
pub const SNAPSHOT_KEY: &str = "conversations";

/// Maximum title length before truncation.
const TITLE_MAX_CHARS: usize = 50;

/// Storage backend for conversation history
///
/// All conversations live under a single key as one JSON document; reads
/// that fail for any reason (absent file, corrupt bytes) are logged and
/// treated as an empty history rather than surfaced to the caller.
pub struct ConversationStore {
    db: Db,
}

impl ConversationStore {
    /// Open or create a conversation store at the given path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the database directory
    ///
    /// # Errors
    ///
    /// Returns `PalaverError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use palaver::storage::ConversationStore;
    ///
    /// # fn main() -> palaver::error::Result<()> {
    /// let store = ConversationStore::new("/tmp/palaver_history.db")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists so opening the DB succeeds.
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PalaverError::Storage(format!("Failed to create parent directory: {}", e))
            })?;
        }

        let db = sled::open(path)
            .map_err(|e| PalaverError::Storage(format!("Failed to open database: {}", e)))?;

        Ok(Self { db })
    }

    /// Open the store at its default platform location
    ///
    /// The path can be overridden via the `PALAVER_HISTORY_DB` environment
    /// variable, which makes it easy to point the binary at a test DB or an
    /// alternate file without changing the user's application data dir.
    pub fn open_default() -> Result<Self> {
        if let Ok(override_path) = std::env::var("PALAVER_HISTORY_DB") {
            return Self::new(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "palaver", "palaver")
            .ok_or_else(|| PalaverError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .map_err(|e| PalaverError::Storage(format!("Failed to create data directory: {}", e)))?;

        Self::new(data_dir.join("history.db"))
    }

    /// Load all stored conversations
    ///
    /// Never fails: an absent snapshot yields an empty list, and a snapshot
    /// that cannot be read or parsed is logged and discarded so a damaged
    /// history file does not prevent startup.
    pub fn load(&self) -> Vec<Conversation> {
        let bytes = match self.db.get(SNAPSHOT_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read conversation history, starting empty: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(conversations) => conversations,
            Err(e) => {
                warn!("Conversation history is corrupt, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Persist the full set of conversations
    ///
    /// Overwrites the previous snapshot in a single write.
    ///
    /// # Errors
    ///
    /// Returns `PalaverError::Storage` if serialization or the write fails
    pub fn save(&self, conversations: &[Conversation]) -> Result<()> {
        let value = serde_json::to_vec(conversations)
            .map_err(|e| PalaverError::Storage(format!("Serialization failed: {}", e)))?;

        self.db
            .insert(SNAPSHOT_KEY, value)
            .map_err(|e| PalaverError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| PalaverError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    /// Retrieve a conversation by ID (full ULID or a shorter prefix)
    pub fn get(&self, id: &str) -> Option<Conversation> {
        self.load().into_iter().find(|c| id_matches(&c.id, id))
    }

    /// Delete a conversation by ID (full ULID or a shorter prefix)
    ///
    /// Returns `true` if a conversation was removed.
    ///
    /// # Errors
    ///
    /// Returns `PalaverError::Storage` if rewriting the snapshot fails
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut conversations = self.load();
        let before = conversations.len();
        conversations.retain(|c| !id_matches(&c.id, id));

        if conversations.len() == before {
            return Ok(false);
        }

        self.save(&conversations)?;
        Ok(true)
    }
}

/// Match a stored conversation ID against a query that may be the full
/// ULID or a prefix (the history table shows the first 8 characters).
pub(crate) fn id_matches(candidate: &str, query: &str) -> bool {
    if query.is_empty() {
        return false;
    }
    if query.len() == candidate.len() {
        candidate == query
    } else {
        candidate.starts_with(query)
    }
}

/// Derive a display title for a conversation
///
/// Uses the first user message with non-empty text, truncated to 50
/// characters with a trailing ellipsis when longer. Conversations without
/// any user text get a dated placeholder.
pub fn derive_title(conversation: &Conversation) -> String {
    let first_user_text = conversation
        .messages
        .iter()
        .find(|m| m.role == MessageRole::User && !m.content.trim().is_empty())
        .map(|m| m.content.trim());

    match first_user_text {
        Some(text) if text.chars().count() > TITLE_MAX_CHARS => {
            let truncated: String = text.chars().take(TITLE_MAX_CHARS).collect();
            format!("{}...", truncated)
        }
        Some(text) => text.to_string(),
        None => format!("Conversation {}", Utc::now().format("%Y-%m-%d")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::tempdir;

    /// Helper: create a temporary store backed by a temp directory.
    ///
    /// Returns both the store and the `TempDir` so the caller keeps
    /// ownership of the directory (preventing it from being removed).
    fn create_test_store() -> (ConversationStore, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let store =
            ConversationStore::new(dir.path().join("history.db")).expect("failed to create store");
        (store, dir)
    }

    fn sample_conversation(text: &str) -> Conversation {
        let mut conversation = Conversation::new();
        conversation.push(Message::user(text));
        conversation.push(Message::assistant("Sure."));
        conversation
    }

    #[test]
    fn test_load_returns_empty_for_new_store() {
        let (store, _dir) = create_test_store();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let (store, _dir) = create_test_store();
        let conversation = sample_conversation("Hello there");
        let id = conversation.id.clone();
        let created_at = conversation.created_at;

        store.save(&[conversation]).expect("save failed");

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, id);
        assert_eq!(loaded[0].created_at, created_at);
        assert_eq!(loaded[0].messages.len(), 2);
        assert_eq!(loaded[0].messages[0].content, "Hello there");
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let (store, _dir) = create_test_store();
        store
            .save(&[sample_conversation("one"), sample_conversation("two")])
            .expect("first save failed");

        let survivor = sample_conversation("three");
        let survivor_id = survivor.id.clone();
        store.save(&[survivor]).expect("second save failed");

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, survivor_id);
    }

    #[test]
    fn test_load_swallows_corrupt_snapshot() {
        let (store, _dir) = create_test_store();
        store
            .save(&[sample_conversation("doomed")])
            .expect("save failed");

        store
            .db
            .insert(SNAPSHOT_KEY, &b"{ not json"[..])
            .expect("corrupt insert failed");

        assert!(store.load().is_empty());
    }

    #[test]
    fn test_get_finds_by_full_id() {
        let (store, _dir) = create_test_store();
        let conversation = sample_conversation("find me");
        let id = conversation.id.clone();
        store.save(&[conversation]).expect("save failed");

        let found = store.get(&id).expect("conversation not found");
        assert_eq!(found.id, id);
    }

    #[test]
    fn test_get_finds_by_prefix() {
        let (store, _dir) = create_test_store();
        let conversation = sample_conversation("prefix me");
        let id = conversation.id.clone();
        store.save(&[conversation]).expect("save failed");

        let found = store.get(&id[..8]).expect("conversation not found");
        assert_eq!(found.id, id);
    }

    #[test]
    fn test_get_returns_none_for_missing_id() {
        let (store, _dir) = create_test_store();
        assert!(store.get("01ARZ3NDEKTSV4RRFFQ69G5FAV").is_none());
    }

    #[test]
    fn test_delete_removes_matching_conversation() {
        let (store, _dir) = create_test_store();
        let keep = sample_conversation("keep");
        let doomed = sample_conversation("doomed");
        let keep_id = keep.id.clone();
        let doomed_id = doomed.id.clone();
        store.save(&[keep, doomed]).expect("save failed");

        let removed = store.delete(&doomed_id).expect("delete failed");
        assert!(removed);

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, keep_id);
    }

    #[test]
    fn test_delete_by_prefix() {
        let (store, _dir) = create_test_store();
        let conversation = sample_conversation("doomed");
        let id = conversation.id.clone();
        store.save(&[conversation]).expect("save failed");

        let removed = store.delete(&id[..8]).expect("delete failed");
        assert!(removed);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_delete_returns_false_for_missing_id() {
        let (store, _dir) = create_test_store();
        store
            .save(&[sample_conversation("kept")])
            .expect("save failed");

        let removed = store
            .delete("01BX5ZZKBKACTAV9WEVGEMMVRZ")
            .expect("delete failed");
        assert!(!removed);
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_delete_with_empty_query_matches_nothing() {
        let (store, _dir) = create_test_store();
        store
            .save(&[sample_conversation("kept")])
            .expect("save failed");

        let removed = store.delete("").expect("delete failed");
        assert!(!removed);
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_derive_title_uses_first_user_message() {
        let conversation = sample_conversation("What is Rust?");
        assert_eq!(derive_title(&conversation), "What is Rust?");
    }

    #[test]
    fn test_derive_title_truncates_long_message() {
        let long = "a".repeat(80);
        let conversation = sample_conversation(&long);

        let title = derive_title(&conversation);
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 3);
        assert!(title.ends_with("..."));
        assert!(title.starts_with("aaa"));
    }

    #[test]
    fn test_derive_title_keeps_exactly_fifty_chars() {
        let exact = "b".repeat(50);
        let conversation = sample_conversation(&exact);
        assert_eq!(derive_title(&conversation), exact);
    }

    #[test]
    fn test_derive_title_skips_messages_without_user_text() {
        let mut conversation = Conversation::new();
        conversation.push(Message::assistant("I speak first"));
        conversation.push(Message::user_with_images(
            "",
            vec!["data:image/png;base64,AAA".into()],
        ));
        conversation.push(Message::user("The real question"));

        assert_eq!(derive_title(&conversation), "The real question");
    }

    #[test]
    fn test_derive_title_falls_back_to_dated_placeholder() {
        let conversation = Conversation::new();
        let title = derive_title(&conversation);
        assert!(title.starts_with("Conversation "));
        assert!(title.contains(&Utc::now().format("%Y-%m-%d").to_string()));
    }

    #[test]
    #[serial]
    fn test_open_default_respects_env_override() {
        // Use nested path to ensure parent directory creation is exercised.
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("nested").join("history.db");
        env::set_var("PALAVER_HISTORY_DB", db_path.to_string_lossy().to_string());

        let store = ConversationStore::open_default().expect("open failed with env override");
        store
            .save(&[sample_conversation("env override")])
            .expect("save failed");

        assert!(db_path.exists());
        assert_eq!(store.load().len(), 1);

        env::remove_var("PALAVER_HISTORY_DB");
    }
}
