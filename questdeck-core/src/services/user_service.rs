// File: questdeck-core/src/services/user_service.rs

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use questdeck_common::models::user::{User, UserPrize};
use questdeck_common::traits::repository_traits::{PrizeRepository, UserRepository};

use crate::Error;

pub struct UserService {
    users: Arc<dyn UserRepository>,
    prizes: Arc<dyn PrizeRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, prizes: Arc<dyn PrizeRepository>) -> Self {
        Self { users, prizes }
    }

    /// Registers a new user. `last_daily_update` is backdated a day so the
    /// next scheduler tick deals their first daily hand.
    pub async fn create_user(
        &self,
        username: &str,
        nickname: &str,
        avatar_url: &str,
    ) -> Result<User, Error> {
        let now = Utc::now();
        let user = User {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            nickname: nickname.to_string(),
            avatar_url: avatar_url.to_string(),
            points: 0,
            created_at: now,
            last_daily_update: now - Duration::hours(24),
        };
        self.users.create(&user).await?;
        debug!("created user {}", user.username);
        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, Error> {
        self.users
            .get_by_username(username)
            .await?
            .ok_or_else(|| Error::UserNotFound(username.to_string()))
    }

    pub async fn list_all(&self) -> Result<Vec<User>, Error> {
        self.users.list_all().await
    }

    pub async fn add_points(&self, username: &str, delta: i64) -> Result<(), Error> {
        self.users.add_points(username, delta).await
    }

    /// A user's prize history with repeat wins of the same prize URL
    /// collapsed to their first entry. The ledger itself keeps every
    /// grant; only the view deduplicates.
    pub async fn prizes(&self, username: &str) -> Result<Vec<UserPrize>, Error> {
        let all = self.prizes.list_for_owner(username).await?;
        let mut seen: HashSet<String> = HashSet::new();
        let out = all
            .into_iter()
            .filter(|p| seen.insert(p.prize_url.clone()))
            .collect();
        Ok(out)
    }
}
