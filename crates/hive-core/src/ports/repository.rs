use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity. Unique-index violations surface as
    /// [`RepoError::Constraint`].
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific lookups.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by the subject id of the external identity provider.
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository: slug lookups, filtered listing, and the ownership-scoped
/// delete used by non-admin callers.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError>;

    /// One page of posts matching the query, in the query's sort order.
    async fn list(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError>;

    /// Total number of posts matching the query's filters (pagination ignored).
    async fn count(&self, query: &PostQuery) -> Result<u64, RepoError>;

    /// Atomically bump the visit counter of the post with this slug.
    async fn increment_visit(&self, slug: &str) -> Result<(), RepoError>;

    /// Delete the post only if it is owned by `user_id`.
    /// Returns false when no matching owned post exists.
    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;
}

/// Sort order for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Newest,
    Oldest,
    Popular,
    Trending,
}

impl SortMode {
    /// Trending restricts results to the last seven days.
    pub fn created_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            SortMode::Trending => Some(now - Duration::days(7)),
            _ => None,
        }
    }
}

/// Filter, sort, and pagination parameters for a post listing.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub category: Option<String>,
    /// Case-insensitive substring match against the title.
    pub search: Option<String>,
    /// Resolved author id (the HTTP layer resolves the username first).
    pub author_id: Option<Uuid>,
    pub featured_only: bool,
    pub sort: SortMode,
    /// 1-based page number.
    pub page: u64,
    pub limit: u64,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            author_id: None,
            featured_only: false,
            sort: SortMode::default(),
            page: 1,
            limit: 10,
        }
    }
}

impl PostQuery {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.limit
    }
}
