use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;

use crate::api::blocking::run_blocking;
use crate::api::envelope::{ApiError, ApiResponse, ApiResult};
use crate::api::extract::{session_token, CurrentUser, JsonBody};
use crate::api::AppState;
use crate::model::user::PublicUser;
use crate::service::dto::{LoginInput, RegisterInput, UpdateProfileInput};

pub async fn signup(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterInput>,
) -> ApiResult<PublicUser> {
    let users = state.users.clone();
    let user = run_blocking(move || users.register(input)).await?;
    Ok(ApiResponse::created(user, "User registered successfully"))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginInput>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.users.clone();
    let (user, token) = run_blocking(move || users.login(input)).await?;
    let cookie = state.cookies.session_cookie(&token);
    let message = format!("Welcome back {}", user.name);
    Ok(([(SET_COOKIE, cookie)], ApiResponse::ok(user, message)))
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(SET_COOKIE, state.cookies.cleared_cookie())],
        ApiResponse::ok("", "logout successfully"),
    )
}

pub async fn profile(State(state): State<AppState>, CurrentUser(actor): CurrentUser) -> ApiResult<PublicUser> {
    let users = state.users.clone();
    let user = run_blocking(move || users.profile(&actor)).await?;
    Ok(ApiResponse::ok(user, "User fetched successfully"))
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    JsonBody(input): JsonBody<UpdateProfileInput>,
) -> ApiResult<PublicUser> {
    let users = state.users.clone();
    let user = run_blocking(move || users.update_profile(&actor, input)).await?;
    Ok(ApiResponse::ok(user, "User updated successfully"))
}

/// Always 200; `data` says whether the session cookie is currently valid.
pub async fn check_session(State(state): State<AppState>, headers: HeaderMap) -> ApiResponse<bool> {
    let valid = session_token(&headers).is_some_and(|token| state.users.resolve_session(token).is_ok());
    ApiResponse::ok(valid, format!("authorized {}", valid))
}
