use async_trait::async_trait;
use uuid::Uuid;

use crate::models::mood::{MoodEntry, MoodPatch, NewMood};
use crate::models::user::{NewUser, User};
use crate::query::MoodQuery;

pub mod memory;
pub mod pool;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for mood entries. Every lookup is scoped by owner.
#[async_trait]
pub trait MoodStore: Send + Sync {
    async fn insert_mood(&self, mood: NewMood) -> StoreResult<MoodEntry>;

    /// Entries matching `query.filter`, sorted, then sliced by offset and limit.
    async fn find_moods(&self, query: &MoodQuery) -> StoreResult<Vec<MoodEntry>>;

    async fn find_mood(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<MoodEntry>>;

    /// Applies `patch` and stamps `last_edited_at`. `None` if no such entry for this owner.
    async fn update_mood(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: MoodPatch,
    ) -> StoreResult<Option<MoodEntry>>;

    /// Returns whether an entry was removed.
    async fn delete_mood(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool>;

    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the username is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
}
