use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::error::Error;
use crate::models::card::{Card, CardTemplate, PoolKind};
use crate::models::user::{User, UserPrize};

#[async_trait]
pub trait CardRepository: Send + Sync {
    async fn create_template(&self, tpl: &CardTemplate) -> Result<(), Error>;
    async fn get_template_by_id(&self, template_id: Uuid) -> Result<Option<CardTemplate>, Error>;
    async fn list_templates(&self) -> Result<Vec<CardTemplate>, Error>;
    async fn list_templates_by_pool(&self, pool: PoolKind) -> Result<Vec<CardTemplate>, Error>;
    async fn delete_templates(&self, template_ids: &[Uuid]) -> Result<(), Error>;

    async fn create_card(&self, card: &Card) -> Result<(), Error>;
    async fn get_card_by_id(&self, card_id: Uuid) -> Result<Option<Card>, Error>;

    /// Lists a user's cards, optionally narrowed to one pool. Results are
    /// ordered by chain name then chain order, so const-pool cards come
    /// back grouped into their chains.
    async fn list_cards_for_owner(&self, owner: &str, pool: Option<PoolKind>) -> Result<Vec<Card>, Error>;

    /// Persists a card's dynamic state (`done`, `progress`, `history`) and
    /// bumps its version. Fails with [`Error::StaleCard`] when the stored
    /// version no longer matches `card.version`.
    async fn update_card(&self, card: &Card) -> Result<(), Error>;

    async fn mark_card_viewed(&self, card_id: Uuid) -> Result<(), Error>;
    async fn delete_card(&self, card_id: Uuid) -> Result<(), Error>;

    /// Removes a user's never-completed cards in `pool`, returning how
    /// many were dropped. Completed cards are left untouched.
    async fn delete_pending_cards(&self, owner: &str, pool: PoolKind) -> Result<u64, Error>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), Error>;
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, Error>;
    async fn list_all(&self) -> Result<Vec<User>, Error>;

    /// Adjusts a user's point balance in a single statement.
    async fn add_points(&self, username: &str, delta: i64) -> Result<(), Error>;

    /// Writes only the rollover marker, never the rest of the row.
    async fn set_last_daily_update(&self, username: &str, at: DateTime<Utc>) -> Result<(), Error>;
}

#[async_trait]
pub trait PrizeRepository: Send + Sync {
    async fn record_grant(&self, prize: &UserPrize) -> Result<(), Error>;
    async fn list_for_owner(&self, owner: &str) -> Result<Vec<UserPrize>, Error>;
}
