use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::elapsed_ms;
use crate::auth::middleware::AuthUser;
use crate::dto::MessageResponse;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::models::mood::{CreateMoodRequest, MoodEntry, MoodPatch, NewMood, UpdateMoodRequest};
use crate::query::{MoodListParams, MoodQuery};
use crate::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Mood not found".into())
}

fn require_note(note: &str) -> AppResult<()> {
    if note.trim().is_empty() {
        return Err(AppError::Validation("Note is required".into()));
    }
    Ok(())
}

pub async fn create_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(body): ApiJson<CreateMoodRequest>,
) -> AppResult<(StatusCode, Json<MoodEntry>)> {
    let started = Instant::now();
    body.validate()?;
    require_note(&body.note)?;

    let entry = state
        .moods
        .insert_mood(NewMood {
            owner_id: auth_user.id,
            category: body.category,
            note: body.note,
            created_at: body.created_at.unwrap_or_else(Utc::now),
        })
        .await?;

    tracing::info!(
        user_id = %auth_user.id,
        mood_id = %entry.id,
        category = %entry.category,
        duration_ms = elapsed_ms(started),
        "Mood added"
    );

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_moods(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<MoodListParams>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let started = Instant::now();
    let query = MoodQuery::build(auth_user.id, &params);
    let moods = state.moods.find_moods(&query).await?;

    tracing::info!(
        user_id = %auth_user.id,
        results = moods.len(),
        search = query.filter.search.as_deref().unwrap_or(""),
        sort = ?query.sort_key,
        direction = ?query.direction,
        offset = query.offset,
        limit = query.limit,
        duration_ms = elapsed_ms(started),
        "Moods fetched"
    );

    Ok(Json(moods))
}

pub async fn get_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(mood_id): Path<Uuid>,
) -> AppResult<Json<MoodEntry>> {
    let started = Instant::now();
    let Some(mood) = state.moods.find_mood(mood_id, auth_user.id).await? else {
        tracing::warn!(
            user_id = %auth_user.id,
            mood_id = %mood_id,
            duration_ms = elapsed_ms(started),
            "Mood not found"
        );
        return Err(not_found());
    };

    tracing::info!(
        user_id = %auth_user.id,
        mood_id = %mood_id,
        duration_ms = elapsed_ms(started),
        "Mood fetched"
    );

    Ok(Json(mood))
}

pub async fn update_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(mood_id): Path<Uuid>,
    ApiJson(body): ApiJson<UpdateMoodRequest>,
) -> AppResult<Json<MoodEntry>> {
    let started = Instant::now();
    body.validate()?;
    if let Some(note) = &body.note {
        require_note(note)?;
    }

    let patch = MoodPatch {
        category: body.category,
        note: body.note,
    };
    let Some(updated) = state.moods.update_mood(mood_id, auth_user.id, patch).await? else {
        tracing::warn!(user_id = %auth_user.id, mood_id = %mood_id, "Mood not found for update");
        return Err(not_found());
    };

    tracing::info!(
        user_id = %auth_user.id,
        mood_id = %mood_id,
        duration_ms = elapsed_ms(started),
        "Mood updated"
    );

    Ok(Json(updated))
}

pub async fn delete_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(mood_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let started = Instant::now();
    if !state.moods.delete_mood(mood_id, auth_user.id).await? {
        tracing::warn!(user_id = %auth_user.id, mood_id = %mood_id, "Mood not found for delete");
        return Err(not_found());
    }

    tracing::info!(
        user_id = %auth_user.id,
        mood_id = %mood_id,
        duration_ms = elapsed_ms(started),
        "Mood deleted"
    );

    Ok(Json(MessageResponse::new("Deleted successfully")))
}
