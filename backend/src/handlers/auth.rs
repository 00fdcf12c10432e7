//! HTTP handlers for authentication endpoints

use axum::{extract::State, Json};
use shared::User;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::auth::{
    AuthService, AuthTokens, CreateUserInput, LoginInput, RegisterBusinessInput, RegisterResponse,
};
use crate::AppState;

/// Register a new business and its admin account
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterBusinessInput>,
) -> AppResult<Json<RegisterResponse>> {
    let service = AuthService::new(state.db, &state.config);
    let response = service.register_business(input).await?;
    Ok(Json(response))
}

/// Login with business name, username and password
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.login(input).await?;
    Ok(Json(tokens))
}

/// Add a user to the caller's business (admin only)
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Json<User>> {
    current_user.0.require_admin()?;
    let service = AuthService::new(state.db, &state.config);
    let user = service.create_user(current_user.0.business_id, input).await?;
    Ok(Json(user))
}
