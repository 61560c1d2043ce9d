use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a single blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    /// URL slug, globally unique. Derived from the title at creation time.
    pub slug: String,
    pub description: Option<String>,
    pub content: String,
    pub category: Option<String>,
    pub img: Option<String>,
    pub visit: i32,
    pub is_featured: bool,
    pub approved: bool,
    pub nectar_awarded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `user_id` with an already-deduplicated slug.
    pub fn new(
        user_id: Uuid,
        title: String,
        slug: String,
        description: Option<String>,
        content: String,
        category: Option<String>,
        img: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            slug,
            description,
            content,
            category,
            img,
            visit: 0,
            is_featured: false,
            approved: false,
            nectar_awarded: false,
            created_at: now,
            updated_at: now,
        }
    }
}
