//! Data Transfer Objects - request/response types for the API.
//!
//! Field names follow the wire format the web client expects (camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub desc: Option<String>,
    pub content: String,
    pub category: Option<String>,
    pub img: Option<String>,
}

/// Body of the admin post actions (feature / approve / award nectar).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostActionRequest {
    pub post_id: Uuid,
}

/// Body of PATCH /users/save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePostRequest {
    pub post_id: String,
}

/// Query string of GET /posts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub cat: Option<String>,
    pub author: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub featured: Option<bool>,
}

/// Post author as embedded in post responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

/// A post as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub user: AuthorResponse,
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    pub visit: i32,
    pub is_featured: bool,
    pub approved: bool,
    pub nectar_awarded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response of GET /posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub has_more: bool,
}

/// Response of PATCH /posts/awardNectar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NectarAwardResponse {
    pub message: String,
    pub nectar: i32,
}

/// A user's own profile as returned by GET /users/me.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    pub saved_posts: Vec<String>,
    pub nectar: i32,
    /// Presentational tier title derived from the nectar balance.
    pub level: String,
    pub created_at: DateTime<Utc>,
}

/// Plain confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
