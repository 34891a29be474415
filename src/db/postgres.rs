use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{MoodStore, StoreError, StoreResult, UserStore};
use crate::models::mood::{MoodEntry, MoodPatch, NewMood};
use crate::models::user::{NewUser, User};
use crate::query::{DateBound, MoodQuery, SortDirection, SortKey};

const MOOD_COLUMNS: &str = "id, owner_id, category, note, created_at, last_edited_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[derive(Debug, FromRow)]
struct MoodRow {
    id: Uuid,
    owner_id: Uuid,
    category: String,
    note: String,
    created_at: DateTime<Utc>,
    last_edited_at: Option<DateTime<Utc>>,
}

impl MoodRow {
    /// Rows whose category no longer decodes are dropped.
    fn into_entry(self) -> Option<MoodEntry> {
        match self.category.parse() {
            Ok(category) => Some(MoodEntry {
                id: self.id,
                owner_id: self.owner_id,
                category,
                note: self.note,
                created_at: self.created_at,
                last_edited_at: self.last_edited_at,
            }),
            Err(e) => {
                tracing::warn!(
                    mood_id = %self.id,
                    error = %e,
                    "Skipping mood row with unknown category"
                );
                None
            }
        }
    }
}

/// Escape LIKE metacharacters so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn push_mood_query(qb: &mut QueryBuilder<'_, Postgres>, query: &MoodQuery) {
    let filter = &query.filter;

    qb.push(" WHERE owner_id = ").push_bind(filter.owner_id);

    if filter.has_invalid_bound() {
        qb.push(" AND FALSE");
    }
    if let Some(DateBound::At(from)) = filter.from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(DateBound::At(to)) = filter.to {
        qb.push(" AND created_at <= ").push_bind(to);
    }
    if let Some(term) = &filter.search {
        let pattern = format!("%{}%", escape_like(term));
        qb.push(" AND (note ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR category ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    let order = match (query.sort_key, query.direction) {
        (SortKey::CreatedAt, SortDirection::Asc) => " ORDER BY created_at ASC, id ASC",
        (SortKey::CreatedAt, SortDirection::Desc) => " ORDER BY created_at DESC, id ASC",
        // Byte order, matching MemoryStore regardless of the database locale.
        (SortKey::Category, SortDirection::Asc) => " ORDER BY category COLLATE \"C\" ASC, id ASC",
        (SortKey::Category, SortDirection::Desc) => {
            " ORDER BY category COLLATE \"C\" DESC, id ASC"
        }
    };
    qb.push(order);

    qb.push(" LIMIT ")
        .push_bind(i64::from(query.limit))
        .push(" OFFSET ")
        .push_bind(i64::try_from(query.offset).unwrap_or(i64::MAX));
}

#[async_trait]
impl MoodStore for PgStore {
    async fn insert_mood(&self, mood: NewMood) -> StoreResult<MoodEntry> {
        let row = sqlx::query_as::<_, MoodRow>(&format!(
            r#"
            INSERT INTO moods (id, owner_id, category, note, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MOOD_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(mood.owner_id)
        .bind(mood.category.label())
        .bind(&mood.note)
        .bind(mood.created_at)
        .fetch_one(&self.pool)
        .await?;

        // The category was just written from the enum, so it always decodes.
        Ok(MoodEntry {
            id: row.id,
            owner_id: row.owner_id,
            category: mood.category,
            note: row.note,
            created_at: row.created_at,
            last_edited_at: row.last_edited_at,
        })
    }

    async fn find_moods(&self, query: &MoodQuery) -> StoreResult<Vec<MoodEntry>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {MOOD_COLUMNS} FROM moods"));
        push_mood_query(&mut qb, query);

        let rows = qb.build_query_as::<MoodRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().filter_map(MoodRow::into_entry).collect())
    }

    async fn find_mood(&self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<MoodEntry>> {
        let row = sqlx::query_as::<_, MoodRow>(&format!(
            "SELECT {MOOD_COLUMNS} FROM moods WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(MoodRow::into_entry))
    }

    async fn update_mood(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: MoodPatch,
    ) -> StoreResult<Option<MoodEntry>> {
        let row = sqlx::query_as::<_, MoodRow>(&format!(
            r#"
            UPDATE moods SET
                category = COALESCE($3, category),
                note = COALESCE($4, note),
                last_edited_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {MOOD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .bind(patch.category.map(|c| c.label()))
        .bind(patch.note)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(MoodRow::into_entry))
    }

    async fn delete_mood(&self, id: Uuid, owner_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM moods WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict("User already exists".into())
            }
            other => StoreError::Database(other),
        })
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
