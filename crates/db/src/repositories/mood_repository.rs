use std::sync::Arc;

use moodchat_core::{is_custom_id, require_non_empty, Mood};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::backends::SharedStore;
use crate::error::{DbError, Result};

/// Storage key holding the user-created personas.
pub const CUSTOM_MOODS_KEY: &str = "customMoods";

/// Built-in personas plus the persisted custom ones.
#[derive(Clone)]
pub struct MoodRepository {
    store: SharedStore,
    custom: Arc<RwLock<Vec<Mood>>>,
}

impl MoodRepository {
    pub async fn load(store: SharedStore) -> Self {
        let custom = match store.get(CUSTOM_MOODS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Mood>>(&raw) {
                Ok(moods) => {
                    let total = moods.len();
                    let moods: Vec<_> = moods.into_iter().filter(Mood::is_custom).collect();
                    if moods.len() != total {
                        warn!(
                            dropped = total - moods.len(),
                            "Ignored stored moods outside the custom namespace"
                        );
                    }
                    info!(count = moods.len(), "Loaded custom moods");
                    moods
                }
                Err(e) => {
                    warn!(error = %e, "Stored custom moods are corrupt, starting with none");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                error!(error = %e, "Failed to read custom moods, starting with none");
                Vec::new()
            }
        };

        Self {
            store,
            custom: Arc::new(RwLock::new(custom)),
        }
    }

    /// Built-ins first, then custom moods in creation order.
    pub async fn list(&self) -> Vec<Mood> {
        let mut moods = Mood::built_ins();
        moods.extend(self.custom.read().await.iter().cloned());
        moods
    }

    pub async fn get(&self, id: &str) -> Option<Mood> {
        if let Some(mood) = Mood::built_ins().into_iter().find(|m| m.id == id) {
            return Some(mood);
        }
        self.custom.read().await.iter().find(|m| m.id == id).cloned()
    }

    pub async fn create(&self, name: &str, prompt: &str) -> Result<Mood> {
        let name = require_non_empty("name", Some(name))?.trim();
        let prompt = require_non_empty("prompt", Some(prompt))?.trim();
        let mood = Mood::custom(name, prompt);

        let mut custom = self.custom.write().await;
        let mut next = custom.clone();
        next.push(mood.clone());
        self.persist(&next).await?;
        *custom = next;

        info!(mood_id = %mood.id, name = %mood.name, "Created custom mood");
        Ok(mood)
    }

    /// Deletes a custom mood. Built-in ids are refused.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if !is_custom_id(id) {
            return Err(DbError::BuiltInMood(id.to_string()));
        }

        let mut custom = self.custom.write().await;
        let next: Vec<Mood> = custom.iter().filter(|m| m.id != id).cloned().collect();
        if next.len() == custom.len() {
            return Err(DbError::MoodNotFound(id.to_string()));
        }
        self.persist(&next).await?;
        *custom = next;

        debug!(mood_id = %id, "Deleted custom mood");
        Ok(())
    }

    async fn persist(&self, moods: &[Mood]) -> Result<()> {
        let serialized = serde_json::to_string(moods)?;
        self.store.set(CUSTOM_MOODS_KEY, &serialized).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryStore;

    #[tokio::test]
    async fn test_list_starts_with_built_ins() {
        let repo = MoodRepository::load(Arc::new(MemoryStore::new())).await;
        let ids: Vec<_> = repo.list().await.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["programmer", "doctor", "business"]);
    }

    #[tokio::test]
    async fn test_create_persists_and_reloads() {
        let store = Arc::new(MemoryStore::new());
        let repo = MoodRepository::load(store.clone()).await;

        let mood = repo.create("Pirate", "You talk like a pirate.").await.unwrap();
        assert!(mood.is_custom());

        let reloaded = MoodRepository::load(store).await;
        let found = reloaded.get(&mood.id).await.unwrap();
        assert_eq!(found.name, "Pirate");
        assert_eq!(reloaded.list().await.len(), 4);
    }

    #[tokio::test]
    async fn test_create_requires_name_and_prompt() {
        let repo = MoodRepository::load(Arc::new(MemoryStore::new())).await;

        let err = repo.create("", "prompt").await.unwrap_err();
        assert!(matches!(err, DbError::Validation(msg) if msg.contains("name")));

        let err = repo.create("Name", "  ").await.unwrap_err();
        assert!(matches!(err, DbError::Validation(msg) if msg.contains("prompt")));
    }

    #[tokio::test]
    async fn test_built_ins_cannot_be_deleted() {
        let repo = MoodRepository::load(Arc::new(MemoryStore::new())).await;

        let err = repo.delete("programmer").await.unwrap_err();
        assert!(matches!(err, DbError::BuiltInMood(_)));
        assert!(repo.get("programmer").await.is_some());
    }

    #[tokio::test]
    async fn test_delete_custom() {
        let repo = MoodRepository::load(Arc::new(MemoryStore::new())).await;
        let mood = repo.create("Poet", "You answer in verse.").await.unwrap();

        repo.delete(&mood.id).await.unwrap();

        assert!(repo.get(&mood.id).await.is_none());
        assert!(matches!(
            repo.delete(&mood.id).await.unwrap_err(),
            DbError::MoodNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_stored_built_in_ids_are_ignored() {
        let raw = serde_json::to_string(&vec![
            Mood {
                id: "programmer".to_string(),
                name: "Hijacked".to_string(),
                prompt: "nope".to_string(),
            },
            Mood::custom("Kept", "kept"),
        ])
        .unwrap();
        let repo = MoodRepository::load(Arc::new(MemoryStore::with_entry(CUSTOM_MOODS_KEY, raw))).await;

        assert_eq!(repo.get("programmer").await.unwrap().name, "Programming Expert");
        assert_eq!(repo.list().await.len(), 4);
    }

    #[tokio::test]
    async fn test_corrupt_custom_moods_fall_back_to_built_ins() {
        let repo =
            MoodRepository::load(Arc::new(MemoryStore::with_entry(CUSTOM_MOODS_KEY, "oops"))).await;
        assert_eq!(repo.list().await.len(), 3);
    }
}
