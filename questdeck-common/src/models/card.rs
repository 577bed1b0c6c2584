use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a card pays out when it completes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Award {
    pub points: i32,
    pub prize: String,
    pub prize_image_url: String,
}

/// One threshold/award pair of an options card. Reporting a value at or
/// above `threshold` wins `award`, unless a higher tier also matches.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OptionTier {
    pub threshold: f32,
    pub award: Award,
}

/// How a card reacts to completion events.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardKind {
    /// Grants its award on every completion event.
    Ordinary { award: Award },
    /// Accumulates reported progress and grants once the total reaches
    /// `max_progress`, then starts over.
    Progress { award: Award, max_progress: i32 },
    /// Grants the award of the highest tier the reported value reaches.
    /// Tiers are kept in ascending threshold order.
    Options { tiers: Vec<OptionTier> },
}

/// Which pool a template deals into. Const cards carry their position
/// within a named chain; daily cards have no chain.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "pool", rename_all = "snake_case")]
pub enum Placement {
    Daily,
    Const { chain_name: String, chain_order: i32 },
}

/// Plain pool tag, used for store queries and the `pool` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Daily,
    Const,
}

impl PoolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolKind::Daily => "daily",
            PoolKind::Const => "const",
        }
    }
}

impl Placement {
    pub fn pool(&self) -> PoolKind {
        match self {
            Placement::Daily => PoolKind::Daily,
            Placement::Const { .. } => PoolKind::Const,
        }
    }

    /// Chain name and order for const placements, `None` for daily.
    pub fn chain(&self) -> Option<(&str, i32)> {
        match self {
            Placement::Daily => None,
            Placement::Const { chain_name, chain_order } => {
                Some((chain_name.as_str(), *chain_order))
            }
        }
    }
}

/// The immutable definition a card instance is stamped from.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CardTemplate {
    pub template_id: Uuid,
    pub title: String,
    pub short_description: String,
    pub long_description: String,
    /// Free-form diversity tag; daily hands can be required to draw
    /// templates with pairwise different goals.
    pub goal: String,
    pub background_url: String,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(flatten)]
    pub kind: CardKind,
    pub created_at: DateTime<Utc>,
}

impl CardTemplate {
    /// Stamps a fresh instance of this template for `owner`, with all
    /// dynamic state zeroed.
    pub fn issue(&self, owner: &str) -> Card {
        Card {
            card_id: Uuid::new_v4(),
            owner_username: owner.to_string(),
            template: self.clone(),
            done: 0,
            progress: 0,
            history: Vec::new(),
            is_viewed: false,
            version: 0,
            created_at: Utc::now(),
        }
    }
}

/// A card held by one user. The template travels with the instance so a
/// later template edit never rewrites cards already in play.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Card {
    pub card_id: Uuid,
    pub owner_username: String,
    pub template: CardTemplate,
    /// Times the card has completed. Never decreases.
    pub done: i32,
    /// Accumulated progress; meaningful for progress cards only.
    pub progress: i32,
    /// Tier index granted per completion; meaningful for options cards
    /// only, where `history.len()` tracks `done`.
    pub history: Vec<i32>,
    pub is_viewed: bool,
    /// Bumped by every state-changing write; guards concurrent updates.
    pub version: i32,
    pub created_at: DateTime<Utc>,
}
