use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{MoodStore, StoreError, StoreResult, UserStore};
use crate::models::mood::{MoodEntry, MoodPatch, NewMood};
use crate::models::user::{NewUser, User};
use crate::query::{MoodQuery, SortDirection, SortKey};

/// Process-local store for development and tests. Contents vanish on restart.
#[derive(Default)]
pub struct MemoryStore {
    moods: RwLock<Vec<MoodEntry>>,
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare(query: &MoodQuery, a: &MoodEntry, b: &MoodEntry) -> Ordering {
    let primary = match query.sort_key {
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::Category => a.category.label().cmp(b.category.label()),
    };
    let primary = match query.direction {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl MoodStore for MemoryStore {
    async fn insert_mood(&self, mood: NewMood) -> StoreResult<MoodEntry> {
        let entry = MoodEntry {
            id: Uuid::new_v4(),
            owner_id: mood.owner_id,
            category: mood.category,
            note: mood.note,
            created_at: mood.created_at,
            last_edited_at: None,
        };
        self.moods.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn find_moods(&self, query: &MoodQuery) -> StoreResult<Vec<MoodEntry>> {
        let moods = self.moods.read().await;
        let mut matched: Vec<MoodEntry> = moods
            .iter()
            .filter(|m| query.filter.matches(m))
            .cloned()
            .collect();
        matched.sort_by(|a, b| compare(query, a, b));

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .collect())
    }

    async fn find_mood(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<MoodEntry>> {
        let moods = self.moods.read().await;
        Ok(moods
            .iter()
            .find(|m| m.id == id && m.owner_id == owner_id)
            .cloned())
    }

    async fn update_mood(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: MoodPatch,
    ) -> StoreResult<Option<MoodEntry>> {
        let mut moods = self.moods.write().await;
        let Some(entry) = moods
            .iter_mut()
            .find(|m| m.id == id && m.owner_id == owner_id)
        else {
            return Ok(None);
        };

        if let Some(category) = patch.category {
            entry.category = category;
        }
        if let Some(note) = patch.note {
            entry.note = note;
        }
        entry.last_edited_at = Some(Utc::now());
        Ok(Some(entry.clone()))
    }

    async fn delete_mood(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool> {
        let mut moods = self.moods.write().await;
        let before = moods.len();
        moods.retain(|m| !(m.id == id && m.owner_id == owner_id));
        Ok(moods.len() != before)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("User already exists".into()));
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }
}
