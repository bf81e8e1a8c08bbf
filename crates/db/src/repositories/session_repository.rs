use std::collections::HashSet;
use std::sync::Arc;

use moodchat_core::{ChatSession, Message, Mood};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::backends::SharedStore;
use crate::error::{DbError, Result};

/// Storage key holding the whole serialized session collection.
pub const SESSIONS_KEY: &str = "chatSessions";

#[derive(Debug, Clone, Default)]
struct SessionState {
    /// Newest first
    sessions: Vec<ChatSession>,
    active: Option<Uuid>,
}

impl SessionState {
    fn session_mut(&mut self, id: Uuid) -> Result<&mut ChatSession> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(DbError::SessionNotFound(id))
    }
}

/// Ordered collection of chat sessions, written through to a
/// [`KeyValueStore`](crate::KeyValueStore) on every mutation.
///
/// Mutations hold one async lock across the storage write, so two racing
/// mutations are applied and persisted one after the other.
#[derive(Clone)]
pub struct SessionRepository {
    store: SharedStore,
    state: Arc<Mutex<SessionState>>,
}

impl SessionRepository {
    /// Loads the stored collection once. Unreadable or corrupt data is logged
    /// and replaced by an empty collection.
    pub async fn load(store: SharedStore) -> Self {
        let sessions = match store.get(SESSIONS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<ChatSession>>(&raw) {
                Ok(sessions) => {
                    info!(
                        backend = store.name(),
                        count = sessions.len(),
                        "Loaded chat sessions"
                    );
                    dedupe(sessions)
                }
                Err(e) => {
                    warn!(
                        backend = store.name(),
                        error = %e,
                        "Stored chat sessions are corrupt, starting with an empty collection"
                    );
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!(backend = store.name(), "No stored chat sessions");
                Vec::new()
            }
            Err(e) => {
                error!(
                    backend = store.name(),
                    error = %e,
                    "Failed to read chat sessions, starting with an empty collection"
                );
                Vec::new()
            }
        };

        Self {
            store,
            state: Arc::new(Mutex::new(SessionState {
                sessions,
                active: None,
            })),
        }
    }

    /// Applies `f` to a copy of the state, persists the copy, then commits it.
    /// A failed write leaves the in-memory state untouched.
    async fn mutate<T>(&self, f: impl FnOnce(&mut SessionState) -> Result<T>) -> Result<T> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let value = f(&mut next)?;

        let serialized = serde_json::to_string(&next.sessions)?;
        self.store.set(SESSIONS_KEY, &serialized).await?;

        *state = next;
        Ok(value)
    }

    /// Creates an empty session for `mood`, inserts it at the front and makes
    /// it the active session.
    pub async fn create_session(&self, mood: Mood) -> Result<ChatSession> {
        let session = self
            .mutate(|state| {
                let title = ChatSession::default_title(state.sessions.len() + 1);
                let session = ChatSession::new(mood, title);
                state.sessions.insert(0, session.clone());
                state.active = Some(session.id);
                Ok(session)
            })
            .await?;

        info!(session_id = %session.id, mood = %session.mood.id, "Created chat session");
        Ok(session)
    }

    /// Appends to the end of the session, preserving arrival order.
    pub async fn append_message(&self, session_id: Uuid, message: Message) -> Result<()> {
        let message_id = message.id;
        self.mutate(|state| {
            let session = state.session_mut(session_id)?;
            if session.contains_message(message_id) {
                return Err(DbError::DuplicateMessage(message_id));
            }
            session.messages.push(message);
            Ok(())
        })
        .await?;

        debug!(session_id = %session_id, message_id = %message_id, "Appended message");
        Ok(())
    }

    /// Toggles the pinned flag and returns the new state.
    pub async fn pin_message(&self, session_id: Uuid, message_id: Uuid) -> Result<bool> {
        self.mutate(|state| {
            let message = state
                .session_mut(session_id)?
                .message_mut(message_id)
                .ok_or(DbError::MessageNotFound {
                    session_id,
                    message_id,
                })?;
            Ok(message.toggle_pin())
        })
        .await
    }

    /// Removes the message. Deleting an id that is already gone is reported
    /// as [`DbError::MessageNotFound`].
    pub async fn delete_message(&self, session_id: Uuid, message_id: Uuid) -> Result<()> {
        self.mutate(|state| {
            state
                .session_mut(session_id)?
                .remove_message(message_id)
                .map(|_| ())
                .ok_or(DbError::MessageNotFound {
                    session_id,
                    message_id,
                })
        })
        .await?;

        debug!(session_id = %session_id, message_id = %message_id, "Deleted message");
        Ok(())
    }

    pub async fn delete_session(&self, session_id: Uuid) -> Result<()> {
        self.mutate(|state| {
            let index = state
                .sessions
                .iter()
                .position(|s| s.id == session_id)
                .ok_or(DbError::SessionNotFound(session_id))?;
            state.sessions.remove(index);
            if state.active == Some(session_id) {
                state.active = None;
            }
            Ok(())
        })
        .await?;

        info!(session_id = %session_id, "Deleted chat session");
        Ok(())
    }

    pub async fn list_sessions(&self) -> Vec<ChatSession> {
        self.state.lock().await.sessions.clone()
    }

    pub async fn get_session(&self, session_id: Uuid) -> Option<ChatSession> {
        self.state
            .lock()
            .await
            .sessions
            .iter()
            .find(|s| s.id == session_id)
            .cloned()
    }

    pub async fn active_session(&self) -> Option<ChatSession> {
        let state = self.state.lock().await;
        let active = state.active?;
        state.sessions.iter().find(|s| s.id == active).cloned()
    }

    /// Switches the active session. The active pointer is not persisted.
    pub async fn set_active(&self, session_id: Uuid) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.sessions.iter().any(|s| s.id == session_id) {
            return Err(DbError::SessionNotFound(session_id));
        }
        state.active = Some(session_id);
        Ok(())
    }
}

fn dedupe(sessions: Vec<ChatSession>) -> Vec<ChatSession> {
    let mut seen = HashSet::new();
    let total = sessions.len();
    let mut unique: Vec<_> = sessions.into_iter().filter(|s| seen.insert(s.id)).collect();
    if unique.len() != total {
        warn!(
            dropped = total - unique.len(),
            "Dropped stored sessions with duplicate ids"
        );
    }

    for session in &mut unique {
        let mut seen = HashSet::new();
        let total = session.messages.len();
        session.messages.retain(|m| seen.insert(m.id));
        if session.messages.len() != total {
            warn!(
                session_id = %session.id,
                dropped = total - session.messages.len(),
                "Dropped stored messages with duplicate ids"
            );
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{KeyValueStore, MemoryStore};
    use async_trait::async_trait;

    async fn empty_repo() -> (SessionRepository, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let repo = SessionRepository::load(store.clone()).await;
        (repo, store)
    }

    #[tokio::test]
    async fn test_create_append_delete_preserves_order() {
        let (repo, _store) = empty_repo().await;
        let session = repo.create_session(Mood::default_mood()).await.unwrap();

        let first = Message::user("first");
        let second = Message::assistant("second");
        let first_id = first.id;
        repo.append_message(session.id, first).await.unwrap();
        repo.append_message(session.id, second).await.unwrap();

        let loaded = repo.get_session(session.id).await.unwrap();
        let contents: Vec<_> = loaded.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);

        repo.delete_message(session.id, first_id).await.unwrap();

        let loaded = repo.get_session(session.id).await.unwrap();
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(loaded.messages[0].content, "second");
    }

    #[tokio::test]
    async fn test_pin_is_a_toggle() {
        let (repo, _store) = empty_repo().await;
        let session = repo.create_session(Mood::default_mood()).await.unwrap();
        let message = Message::user("pin me");
        let message_id = message.id;
        repo.append_message(session.id, message).await.unwrap();

        assert!(repo.pin_message(session.id, message_id).await.unwrap());
        assert!(!repo.pin_message(session.id, message_id).await.unwrap());

        let loaded = repo.get_session(session.id).await.unwrap();
        assert!(!loaded.messages[0].is_pinned);
    }

    #[tokio::test]
    async fn test_missing_ids_are_reported() {
        let (repo, _store) = empty_repo().await;
        let session = repo.create_session(Mood::default_mood()).await.unwrap();
        let unknown = Uuid::new_v4();

        let err = repo.pin_message(session.id, unknown).await.unwrap_err();
        assert!(matches!(err, DbError::MessageNotFound { .. }));

        let err = repo.pin_message(unknown, unknown).await.unwrap_err();
        assert!(matches!(err, DbError::SessionNotFound(id) if id == unknown));

        let err = repo
            .append_message(unknown, Message::user("lost"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_twice_reports_not_found() {
        let (repo, _store) = empty_repo().await;
        let session = repo.create_session(Mood::default_mood()).await.unwrap();
        let message = Message::user("bye");
        let message_id = message.id;
        repo.append_message(session.id, message).await.unwrap();

        repo.delete_message(session.id, message_id).await.unwrap();
        let err = repo
            .delete_message(session.id, message_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::MessageNotFound { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_message_id_rejected() {
        let (repo, _store) = empty_repo().await;
        let session = repo.create_session(Mood::default_mood()).await.unwrap();
        let message = Message::user("once");

        repo.append_message(session.id, message.clone()).await.unwrap();
        let err = repo.append_message(session.id, message).await.unwrap_err();
        assert!(matches!(err, DbError::DuplicateMessage(_)));
    }

    #[tokio::test]
    async fn test_new_sessions_go_first_and_become_active() {
        let (repo, _store) = empty_repo().await;
        let first = repo.create_session(Mood::default_mood()).await.unwrap();
        let second = repo.create_session(Mood::built_ins()[1].clone()).await.unwrap();

        let sessions = repo.list_sessions().await;
        assert_eq!(sessions[0].id, second.id);
        assert_eq!(sessions[1].id, first.id);
        assert_eq!(first.title, "Chat 1");
        assert_eq!(second.title, "Chat 2");
        assert_eq!(repo.active_session().await.unwrap().id, second.id);

        repo.set_active(first.id).await.unwrap();
        assert_eq!(repo.active_session().await.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_delete_active_session_clears_active() {
        let (repo, _store) = empty_repo().await;
        let session = repo.create_session(Mood::default_mood()).await.unwrap();

        repo.delete_session(session.id).await.unwrap();

        assert!(repo.active_session().await.is_none());
        assert!(repo.list_sessions().await.is_empty());
        assert!(matches!(
            repo.delete_session(session.id).await.unwrap_err(),
            DbError::SessionNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_mutations_persist_and_reload() {
        let (repo, store) = empty_repo().await;
        let session = repo.create_session(Mood::default_mood()).await.unwrap();
        let message = Message::user("remember me");
        let message_id = message.id;
        repo.append_message(session.id, message).await.unwrap();
        repo.pin_message(session.id, message_id).await.unwrap();

        let reloaded = SessionRepository::load(store).await;
        let loaded = reloaded.get_session(session.id).await.unwrap();
        assert_eq!(loaded.messages.len(), 1);
        assert!(loaded.messages[0].is_pinned);
        assert_eq!(loaded.mood, Mood::default_mood());
    }

    #[tokio::test]
    async fn test_corrupt_storage_starts_empty() {
        let store = Arc::new(MemoryStore::with_entry(SESSIONS_KEY, "{not json"));
        let repo = SessionRepository::load(store.clone()).await;

        assert!(repo.list_sessions().await.is_empty());

        // The collection stays usable and overwrites the corrupt record.
        repo.create_session(Mood::default_mood()).await.unwrap();
        let raw = store.get(SESSIONS_KEY).await.unwrap().unwrap();
        let parsed: Vec<ChatSession> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[tokio::test]
    async fn test_load_drops_duplicate_message_ids() {
        let mut session = ChatSession::new(Mood::default_mood(), "Chat 1");
        let original = Message::user("original");
        let mut copy = Message::assistant("copy");
        copy.id = original.id;
        session.messages = vec![original.clone(), copy, Message::assistant("reply")];

        let raw = serde_json::to_string(&vec![session.clone(), session.clone()]).unwrap();
        let store = Arc::new(MemoryStore::with_entry(SESSIONS_KEY, &raw));
        let repo = SessionRepository::load(store).await;

        let sessions = repo.list_sessions().await;
        assert_eq!(sessions.len(), 1);
        let contents: Vec<_> = sessions[0].messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["original", "reply"]);

        // Deleting the surviving copy leaves no trace of the id.
        repo.delete_message(session.id, original.id).await.unwrap();
        let loaded = repo.get_session(session.id).await.unwrap();
        assert!(!loaded.contains_message(original.id));
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        let (repo, store) = empty_repo().await;
        let session_id = repo.create_session(Mood::default_mood()).await.unwrap().id;

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.append_message(session_id, Message::user(format!("msg {}", i)))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reloaded = SessionRepository::load(store).await;
        assert_eq!(reloaded.get_session(session_id).await.unwrap().messages.len(), 20);
    }

    struct ReadOnlyStore;

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        fn name(&self) -> &'static str {
            "read-only"
        }

        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, key: &str, _value: &str) -> Result<()> {
            Err(DbError::InvalidKey(key.to_string()))
        }

        async fn clear(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_untouched() {
        let repo = SessionRepository::load(Arc::new(ReadOnlyStore)).await;

        assert!(repo.create_session(Mood::default_mood()).await.is_err());
        assert!(repo.list_sessions().await.is_empty());
        assert!(repo.active_session().await.is_none());
    }
}
