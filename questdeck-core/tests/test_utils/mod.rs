// File: questdeck-core/tests/test_utils/mod.rs
//
// Mock repositories and fixture builders shared by the service and
// rotation tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockall::mock;
use uuid::Uuid;

use questdeck_common::error::Error;
use questdeck_common::models::card::{
    Award, Card, CardKind, CardTemplate, OptionTier, Placement, PoolKind,
};
use questdeck_common::models::user::{User, UserPrize};
use questdeck_common::traits::repository_traits::{
    CardRepository, PrizeRepository, UserRepository,
};

mock! {
    pub CardRepo {}

    #[async_trait]
    impl CardRepository for CardRepo {
        async fn create_template(&self, tpl: &CardTemplate) -> Result<(), Error>;
        async fn get_template_by_id(&self, template_id: Uuid) -> Result<Option<CardTemplate>, Error>;
        async fn list_templates(&self) -> Result<Vec<CardTemplate>, Error>;
        async fn list_templates_by_pool(&self, pool: PoolKind) -> Result<Vec<CardTemplate>, Error>;
        async fn delete_templates(&self, template_ids: &[Uuid]) -> Result<(), Error>;
        async fn create_card(&self, card: &Card) -> Result<(), Error>;
        async fn get_card_by_id(&self, card_id: Uuid) -> Result<Option<Card>, Error>;
        async fn list_cards_for_owner(&self, owner: &str, pool: Option<PoolKind>) -> Result<Vec<Card>, Error>;
        async fn update_card(&self, card: &Card) -> Result<(), Error>;
        async fn mark_card_viewed(&self, card_id: Uuid) -> Result<(), Error>;
        async fn delete_card(&self, card_id: Uuid) -> Result<(), Error>;
        async fn delete_pending_cards(&self, owner: &str, pool: PoolKind) -> Result<u64, Error>;
    }
}

mock! {
    pub UserRepo {}

    #[async_trait]
    impl UserRepository for UserRepo {
        async fn create(&self, user: &User) -> Result<(), Error>;
        async fn get_by_username(&self, username: &str) -> Result<Option<User>, Error>;
        async fn list_all(&self) -> Result<Vec<User>, Error>;
        async fn add_points(&self, username: &str, delta: i64) -> Result<(), Error>;
        async fn set_last_daily_update(&self, username: &str, at: DateTime<Utc>) -> Result<(), Error>;
    }
}

mock! {
    pub PrizeRepo {}

    #[async_trait]
    impl PrizeRepository for PrizeRepo {
        async fn record_grant(&self, prize: &UserPrize) -> Result<(), Error>;
        async fn list_for_owner(&self, owner: &str) -> Result<Vec<UserPrize>, Error>;
    }
}

pub fn award(points: i32) -> Award {
    Award {
        points,
        prize: format!("prize-{points}"),
        prize_image_url: format!("https://img.example/{points}.png"),
    }
}

pub fn template(title: &str, goal: &str, placement: Placement, kind: CardKind) -> CardTemplate {
    CardTemplate {
        template_id: Uuid::new_v4(),
        title: title.into(),
        short_description: String::new(),
        long_description: String::new(),
        goal: goal.into(),
        background_url: String::new(),
        placement,
        kind,
        created_at: Utc::now(),
    }
}

pub fn daily_template(title: &str, goal: &str) -> CardTemplate {
    template(title, goal, Placement::Daily, CardKind::Ordinary { award: award(10) })
}

pub fn const_template(title: &str, chain: &str, order: i32) -> CardTemplate {
    let placement = Placement::Const { chain_name: chain.into(), chain_order: order };
    template(title, "g", placement, CardKind::Ordinary { award: award(10) })
}

pub fn options_template(thresholds: &[f32], points: &[i32]) -> CardTemplate {
    let tiers = thresholds
        .iter()
        .zip(points)
        .map(|(t, p)| OptionTier { threshold: *t, award: award(*p) })
        .collect();
    template("opts", "g", Placement::Daily, CardKind::Options { tiers })
}

pub fn user(username: &str, last_daily_update: DateTime<Utc>) -> User {
    User {
        user_id: Uuid::new_v4(),
        username: username.into(),
        nickname: username.into(),
        avatar_url: String::new(),
        points: 0,
        created_at: Utc::now() - Duration::days(30),
        last_daily_update,
    }
}
