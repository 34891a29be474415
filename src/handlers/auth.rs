use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::auth::{
    jwt::{create_access_token, IssuedToken},
    password::{hash_password, verify_password},
};
use crate::dto::MessageResponse;
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::models::user::{LoginRequest, NewUser, SignupRequest};
use crate::AppState;

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(mut body): ApiJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    // Length rules apply to the name as it will be stored.
    body.username = body.username.trim().to_string();
    body.validate()?;

    let password_hash = hash_password(&body.password)?;
    let user = state
        .users
        .create_user(NewUser {
            username: body.username,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Signup successful")),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AppResult<Json<IssuedToken>> {
    // Unknown user and wrong password are indistinguishable to the caller.
    let user = state
        .users
        .find_user_by_username(body.username.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&body.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Login rejected");
        return Err(AppError::Unauthorized);
    }

    let issued = create_access_token(user.id, &user.username, &state.config)?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(issued))
}
