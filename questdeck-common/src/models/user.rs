use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub nickname: String,
    pub avatar_url: String,
    pub points: i64,
    pub created_at: DateTime<Utc>,
    /// Local-midnight stamp of the last daily rollover this user received.
    pub last_daily_update: DateTime<Utc>,
}

/// One ledger entry in a user's prize history. Append-only; repeat wins
/// of the same prize are collapsed at display time, not here.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct UserPrize {
    pub prize_id: Uuid,
    pub owner_username: String,
    pub prize_url: String,
    pub available: bool,
    pub granted_at: DateTime<Utc>,
}

impl UserPrize {
    pub fn new(owner: &str, prize_url: &str) -> Self {
        Self {
            prize_id: Uuid::new_v4(),
            owner_username: owner.to_string(),
            prize_url: prize_url.to_string(),
            available: true,
            granted_at: Utc::now(),
        }
    }
}
