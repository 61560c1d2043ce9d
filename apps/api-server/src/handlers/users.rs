//! User-scoped handlers: profile, saved posts, save toggle.

use actix_web::{HttpResponse, web};

use hive_core::ports::BaseRepository;
use hive_shared::dto::{MessageResponse, SavePostRequest, UserResponse};

use super::posts::resolve_user;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/users/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = resolve_user(&state, &identity).await?;
    let level = user.level().title().to_string();

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        img: user.img,
        saved_posts: user.saved_posts,
        nectar: user.nectar,
        level,
        created_at: user.created_at,
    }))
}

/// GET /api/users/saved
pub async fn saved_posts(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = resolve_user(&state, &identity).await?;

    Ok(HttpResponse::Ok().json(user.saved_posts))
}

/// PATCH /api/users/save
pub async fn save_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<SavePostRequest>,
) -> AppResult<HttpResponse> {
    let mut user = resolve_user(&state, &identity).await?;

    let saved = user.toggle_saved_post(&body.post_id);
    state.users.update(user).await?;

    let message = if saved { "Post saved" } else { "Post unsaved" };
    Ok(HttpResponse::Ok().json(MessageResponse::new(message)))
}
