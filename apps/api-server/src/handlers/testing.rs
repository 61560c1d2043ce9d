//! Shared helpers for handler tests: an in-memory app instance, token
//! issuance, and store seeding.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, Error, test, web};

use hive_core::domain::{Post, User};
use hive_core::ports::{BaseRepository, Role, TokenService};
use hive_infra::{JwtConfig, JwtTokenService};

use crate::state::AppState;

pub fn token_service() -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: 1,
        issuer: "test-issuer".to_string(),
    }))
}

/// Authorization header for a subject with the given role.
pub fn bearer(tokens: &Arc<dyn TokenService>, subject: &str, role: Role) -> (&'static str, String) {
    let token = tokens.issue_token(subject, role).expect("issue test token");
    ("Authorization", format!("Bearer {token}"))
}

pub async fn seed_user(state: &AppState, external_id: &str, username: &str) -> User {
    let user = User::new(
        external_id.to_string(),
        username.to_string(),
        format!("{username}@example.com"),
    );
    state.users.insert(user).await.expect("seed user")
}

pub async fn seed_post(state: &AppState, user: &User, title: &str, slug: &str) -> Post {
    let post = Post::new(
        user.id,
        title.to_string(),
        slug.to_string(),
        None,
        "content".to_string(),
        Some("general".to_string()),
        None,
    );
    state.posts.insert(post).await.expect("seed post")
}

pub async fn init_app(
    state: AppState,
    tokens: Arc<dyn TokenService>,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(web::Data::new(tokens))
            .configure(super::configure_routes),
    )
    .await
}
