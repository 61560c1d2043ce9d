use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - linked to an external identity provider by `external_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Subject identifier issued by the external identity provider. Unique.
    pub external_id: String,
    pub username: String,
    pub email: String,
    pub img: Option<String>,
    /// Identifiers of posts the user has saved. Referential integrity is
    /// not enforced; stale ids are tolerated.
    pub saved_posts: Vec<String>,
    /// Nectar balance, never negative.
    pub nectar: i32,
    pub last_nectar_award_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(external_id: String, username: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            external_id,
            username,
            email,
            img: None,
            saved_posts: Vec::new(),
            nectar: 0,
            last_nectar_award_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Toggle a post id in the saved list. Returns true if the post is now saved.
    pub fn toggle_saved_post(&mut self, post_id: &str) -> bool {
        if let Some(pos) = self.saved_posts.iter().position(|p| p == post_id) {
            self.saved_posts.remove(pos);
            false
        } else {
            self.saved_posts.push(post_id.to_string());
            true
        }
    }

    pub fn level(&self) -> UserLevel {
        UserLevel::from_nectar(self.nectar)
    }
}

/// Gamification tier derived from a user's nectar balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UserLevel {
    WorkerBee,
    SoldierBee,
    RoyalBee,
    QueenBee,
}

impl UserLevel {
    /// Map a nectar balance to a tier. Total over all non-negative balances.
    pub fn from_nectar(nectar: i32) -> Self {
        if nectar < 10 {
            UserLevel::WorkerBee
        } else if nectar < 50 {
            UserLevel::SoldierBee
        } else if nectar < 100 {
            UserLevel::RoyalBee
        } else {
            UserLevel::QueenBee
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            UserLevel::WorkerBee => "Worker Bee",
            UserLevel::SoldierBee => "Soldier Bee",
            UserLevel::RoyalBee => "Royal Bee",
            UserLevel::QueenBee => "Queen Bee",
        }
    }
}
