// File: questdeck-core/src/services/card_service.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use questdeck_common::models::card::{Award, CardKind, CardTemplate, Placement, PoolKind};
use questdeck_common::models::user::UserPrize;
use questdeck_common::traits::repository_traits::{CardRepository, PrizeRepository};

use crate::engine::views::{partition_cards, UserCards};
use crate::engine::{self, CardAdvance};
use crate::Error;

/// Attempts at the read-apply-update cycle before a completion event
/// gives up and surfaces the conflict.
const COMPLETE_MAX_ATTEMPTS: u32 = 3;

/// Admin input for a new template; ids and timestamps are stamped here.
#[derive(Debug, Clone)]
pub struct TemplateDraft {
    pub title: String,
    pub short_description: String,
    pub long_description: String,
    pub goal: String,
    pub background_url: String,
    pub placement: Placement,
    pub kind: CardKind,
}

/// What one successful completion event produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CardCompletion {
    pub owner_username: String,
    pub points: i32,
    pub award: Option<Award>,
}

pub struct CardService {
    cards: Arc<dyn CardRepository>,
    prizes: Arc<dyn PrizeRepository>,
}

impl CardService {
    pub fn new(cards: Arc<dyn CardRepository>, prizes: Arc<dyn PrizeRepository>) -> Self {
        Self { cards, prizes }
    }

    /// Validates and persists a new template. Rejecting malformed drafts
    /// here is what lets the engine dispatch on `kind` without guards.
    pub async fn create_template(&self, draft: TemplateDraft) -> Result<CardTemplate, Error> {
        validate_kind(&draft.kind)?;

        let tpl = CardTemplate {
            template_id: Uuid::new_v4(),
            title: draft.title,
            short_description: draft.short_description,
            long_description: draft.long_description,
            goal: draft.goal,
            background_url: draft.background_url,
            placement: draft.placement,
            kind: draft.kind,
            created_at: Utc::now(),
        };
        self.cards.create_template(&tpl).await?;
        debug!("created template {} ({})", tpl.template_id, tpl.title);
        Ok(tpl)
    }

    pub async fn list_templates(&self) -> Result<Vec<CardTemplate>, Error> {
        self.cards.list_templates().await
    }

    pub async fn get_template(&self, template_id: Uuid) -> Result<CardTemplate, Error> {
        self.cards
            .get_template_by_id(template_id)
            .await?
            .ok_or(Error::TemplateNotFound(template_id))
    }

    pub async fn delete_templates(&self, template_ids: &[Uuid]) -> Result<(), Error> {
        self.cards.delete_templates(template_ids).await
    }

    /// Applies one completion event to a card.
    ///
    /// Loads the card, runs the engine, and writes the result back under
    /// the card's version guard; a lost race reloads and reapplies, up to
    /// [`COMPLETE_MAX_ATTEMPTS`] times. The prize ledger is appended only
    /// after the winning write, so a retried attempt can never grant
    /// twice.
    pub async fn complete_card(
        &self,
        card_id: Uuid,
        progress_delta: i32,
        option_value: f32,
    ) -> Result<CardCompletion, Error> {
        let mut attempt = 0;
        loop {
            let mut card = self
                .cards
                .get_card_by_id(card_id)
                .await?
                .ok_or(Error::CardNotFound(card_id))?;

            let advance = engine::apply(&mut card, progress_delta, option_value);

            // BelowThreshold changed nothing, so there is nothing to write
            // and the caller sees a quiet zero-point success.
            if advance != CardAdvance::BelowThreshold {
                match self.cards.update_card(&card).await {
                    Ok(()) => {}
                    Err(Error::StaleCard(id)) => {
                        attempt += 1;
                        if attempt >= COMPLETE_MAX_ATTEMPTS {
                            return Err(Error::StaleCard(id));
                        }
                        warn!(
                            "card {} completion lost a write race (attempt {}), retrying",
                            id, attempt
                        );
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            let award = match advance {
                CardAdvance::Rewarded(a) => Some(a),
                CardAdvance::PartialProgress | CardAdvance::BelowThreshold => None,
            };

            if let Some(ref a) = award {
                let entry = UserPrize::new(&card.owner_username, &a.prize_image_url);
                self.prizes.record_grant(&entry).await?;
            }

            let points = award.as_ref().map(|a| a.points).unwrap_or(0);
            return Ok(CardCompletion {
                owner_username: card.owner_username,
                points,
                award,
            });
        }
    }

    /// A user's cards split into pending/done views, chains collapsed to
    /// one representative each.
    pub async fn user_cards(&self, owner: &str) -> Result<UserCards, Error> {
        let daily = self
            .cards
            .list_cards_for_owner(owner, Some(PoolKind::Daily))
            .await?;
        let chained = self
            .cards
            .list_cards_for_owner(owner, Some(PoolKind::Const))
            .await?;
        Ok(partition_cards(daily, chained))
    }

    pub async fn mark_viewed(&self, card_id: Uuid) -> Result<(), Error> {
        self.cards.mark_card_viewed(card_id).await
    }

    pub async fn delete_card(&self, card_id: Uuid) -> Result<(), Error> {
        self.cards.delete_card(card_id).await
    }
}

fn validate_kind(kind: &CardKind) -> Result<(), Error> {
    match kind {
        CardKind::Ordinary { .. } => Ok(()),
        CardKind::Progress { max_progress, .. } => {
            if *max_progress < 1 {
                return Err(Error::InvalidTemplate(format!(
                    "progress target must be at least 1, got {max_progress}"
                )));
            }
            Ok(())
        }
        CardKind::Options { tiers } => {
            if tiers.is_empty() {
                return Err(Error::InvalidTemplate(
                    "options card needs at least one tier".into(),
                ));
            }
            for pair in tiers.windows(2) {
                if pair[1].threshold <= pair[0].threshold {
                    return Err(Error::InvalidTemplate(format!(
                        "tier thresholds must be strictly ascending: {} then {}",
                        pair[0].threshold, pair[1].threshold
                    )));
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questdeck_common::models::card::OptionTier;

    fn award(points: i32) -> Award {
        Award {
            points,
            prize: "p".into(),
            prize_image_url: "https://img.example/p.png".into(),
        }
    }

    #[test]
    fn ordinary_drafts_always_validate() {
        assert!(validate_kind(&CardKind::Ordinary { award: award(1) }).is_ok());
    }

    #[test]
    fn progress_target_must_be_positive() {
        let bad = CardKind::Progress { award: award(1), max_progress: 0 };
        assert!(matches!(validate_kind(&bad), Err(Error::InvalidTemplate(_))));

        let ok = CardKind::Progress { award: award(1), max_progress: 1 };
        assert!(validate_kind(&ok).is_ok());
    }

    #[test]
    fn options_need_ascending_nonempty_tiers() {
        let empty = CardKind::Options { tiers: vec![] };
        assert!(matches!(validate_kind(&empty), Err(Error::InvalidTemplate(_))));

        let unordered = CardKind::Options {
            tiers: vec![
                OptionTier { threshold: 20.0, award: award(2) },
                OptionTier { threshold: 10.0, award: award(1) },
            ],
        };
        assert!(matches!(validate_kind(&unordered), Err(Error::InvalidTemplate(_))));

        let flat = CardKind::Options {
            tiers: vec![
                OptionTier { threshold: 10.0, award: award(1) },
                OptionTier { threshold: 10.0, award: award(2) },
            ],
        };
        assert!(matches!(validate_kind(&flat), Err(Error::InvalidTemplate(_))));

        let ok = CardKind::Options {
            tiers: vec![
                OptionTier { threshold: 10.0, award: award(1) },
                OptionTier { threshold: 20.0, award: award(2) },
            ],
        };
        assert!(validate_kind(&ok).is_ok());
    }
}
