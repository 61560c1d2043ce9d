//! In-memory repository implementations - used when no database is configured
//! and as the backing store for handler tests.
//!
//! Semantics mirror the Postgres repositories, including the unique indexes:
//! inserting a duplicate slug, username, email, or external id fails with
//! [`RepoError::Constraint`]. Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use hive_core::domain::{Post, User};
use hive_core::error::RepoError;
use hive_core::ports::{BaseRepository, PostQuery, PostRepository, SortMode, UserRepository};

/// In-memory user store using a HashMap with an async RwLock.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&user.id) {
            return Err(RepoError::Constraint("duplicate user id".to_string()));
        }
        let clash = store.values().any(|u| {
            u.external_id == user.external_id
                || u.username == user.username
                || u.email == user.email
        });
        if clash {
            return Err(RepoError::Constraint(
                "duplicate external id, username, or email".to_string(),
            ));
        }
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        let mut user = user;
        user.updated_at = Utc::now();
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .find(|u| u.external_id == external_id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.username == username).cloned())
    }
}

/// In-memory post store.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(post: &Post, query: &PostQuery, cutoff: Option<chrono::DateTime<Utc>>) -> bool {
        if let Some(cat) = &query.category {
            if post.category.as_deref() != Some(cat.as_str()) {
                return false;
            }
        }
        if let Some(search) = &query.search {
            if !post.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if let Some(author_id) = query.author_id {
            if post.user_id != author_id {
                return false;
            }
        }
        if query.featured_only && !post.is_featured {
            return false;
        }
        if let Some(cutoff) = cutoff {
            if post.created_at < cutoff {
                return false;
            }
        }
        true
    }

    async fn filtered(&self, query: &PostQuery) -> Vec<Post> {
        let cutoff = query.sort.created_after(Utc::now());
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .values()
            .filter(|p| Self::matches(p, query, cutoff))
            .cloned()
            .collect();

        match query.sort {
            SortMode::Newest => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortMode::Oldest => posts.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortMode::Popular | SortMode::Trending => posts.sort_by(|a, b| {
                b.visit
                    .cmp(&a.visit)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
        }

        posts
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&post.id) {
            return Err(RepoError::Constraint("duplicate post id".to_string()));
        }
        if store.values().any(|p| p.slug == post.slug) {
            return Err(RepoError::Constraint("duplicate slug".to_string()));
        }
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        let mut post = post;
        post.updated_at = Utc::now();
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|p| p.slug == slug).cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().any(|p| p.slug == slug))
    }

    async fn list(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        let posts = self.filtered(query).await;
        Ok(posts
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn count(&self, query: &PostQuery) -> Result<u64, RepoError> {
        Ok(self.filtered(query).await.len() as u64)
    }

    async fn increment_visit(&self, slug: &str) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        match store.values_mut().find(|p| p.slug == slug) {
            Some(post) => {
                post.visit += 1;
                Ok(())
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let mut store = self.store.write().await;
        match store.get(&id) {
            Some(post) if post.user_id == user_id => {
                store.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
