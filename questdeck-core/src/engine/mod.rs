// File: questdeck-core/src/engine/mod.rs
//
// Pure card logic: how a single completion event changes a card, how a
// user's cards partition into pending/done views, and how daily hands
// are drawn. Nothing in here touches the store.

pub mod sampler;
pub mod views;

use questdeck_common::models::card::{Award, Card, CardKind};

/// What one completion event did to a card.
#[derive(Debug, Clone, PartialEq)]
pub enum CardAdvance {
    /// The card completed and granted this award.
    Rewarded(Award),
    /// A progress card moved forward without reaching its target. The new
    /// progress must still be persisted.
    PartialProgress,
    /// An options report below the lowest tier. The card is untouched and
    /// nothing is granted; callers treat this as a quiet success.
    BelowThreshold,
}

/// Applies one completion event to `card` in place.
///
/// `progress_delta` only matters for progress cards, `option_value` only
/// for options cards; the other input is ignored. Calling this twice
/// grants twice: ordinary and options cards complete on every event, and
/// nothing here is idempotent.
pub fn apply(card: &mut Card, progress_delta: i32, option_value: f32) -> CardAdvance {
    match &card.template.kind {
        CardKind::Ordinary { award } => {
            let granted = award.clone();
            card.done += 1;
            CardAdvance::Rewarded(granted)
        }
        CardKind::Progress { award, max_progress } => {
            let granted = award.clone();
            let target = *max_progress;
            card.progress += progress_delta;
            if card.progress >= target {
                // overflow past the target is discarded, not carried over
                card.done += 1;
                card.progress = 0;
                CardAdvance::Rewarded(granted)
            } else {
                CardAdvance::PartialProgress
            }
        }
        CardKind::Options { tiers } => {
            // highest tier whose threshold the value reaches
            let mut chosen = None;
            for (i, tier) in tiers.iter().enumerate() {
                if option_value >= tier.threshold {
                    chosen = Some(i);
                }
            }
            let Some(idx) = chosen else {
                return CardAdvance::BelowThreshold;
            };
            let granted = tiers[idx].award.clone();
            card.history.push(idx as i32);
            card.done += 1;
            CardAdvance::Rewarded(granted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use questdeck_common::models::card::{CardTemplate, OptionTier, Placement, PoolKind};
    use uuid::Uuid;

    fn award(points: i32) -> Award {
        Award {
            points,
            prize: format!("prize-{points}"),
            prize_image_url: format!("https://img.example/{points}.png"),
        }
    }

    fn template(kind: CardKind) -> CardTemplate {
        CardTemplate {
            template_id: Uuid::new_v4(),
            title: "t".into(),
            short_description: "s".into(),
            long_description: "l".into(),
            goal: "g".into(),
            background_url: "".into(),
            placement: Placement::Daily,
            kind,
            created_at: Utc::now(),
        }
    }

    fn card(kind: CardKind) -> Card {
        template(kind).issue("kappa")
    }

    #[test]
    fn ordinary_grants_every_time() {
        let mut c = card(CardKind::Ordinary { award: award(100) });

        assert_eq!(apply(&mut c, 0, 0.0), CardAdvance::Rewarded(award(100)));
        assert_eq!(c.done, 1);

        // a second event grants again; completion is not idempotent
        assert_eq!(apply(&mut c, 0, 0.0), CardAdvance::Rewarded(award(100)));
        assert_eq!(c.done, 2);
    }

    #[test]
    fn progress_accumulates_then_grants_and_resets() {
        let mut c = card(CardKind::Progress { award: award(200), max_progress: 100 });

        assert_eq!(apply(&mut c, 10, 0.0), CardAdvance::PartialProgress);
        assert_eq!(apply(&mut c, 5, 0.0), CardAdvance::PartialProgress);
        assert_eq!(c.progress, 15);
        assert_eq!(c.done, 0);

        // crossing the target grants exactly once and discards overflow
        assert_eq!(apply(&mut c, 100, 0.0), CardAdvance::Rewarded(award(200)));
        assert_eq!(c.done, 1);
        assert_eq!(c.progress, 0);
    }

    #[test]
    fn progress_exact_target_grants() {
        let mut c = card(CardKind::Progress { award: award(50), max_progress: 10 });
        assert_eq!(apply(&mut c, 10, 0.0), CardAdvance::Rewarded(award(50)));
        assert_eq!(c.progress, 0);
        assert_eq!(c.done, 1);
    }

    fn options_card() -> Card {
        card(CardKind::Options {
            tiers: vec![
                OptionTier { threshold: 10.0, award: award(100) },
                OptionTier { threshold: 20.0, award: award(200) },
                OptionTier { threshold: 30.0, award: award(300) },
            ],
        })
    }

    #[test]
    fn options_below_lowest_tier_is_a_quiet_no_op() {
        let mut c = options_card();
        let before = c.clone();

        assert_eq!(apply(&mut c, 0, 5.0), CardAdvance::BelowThreshold);
        assert_eq!(c, before, "card state must be untouched");
    }

    #[test]
    fn options_picks_highest_tier_reached() {
        let cases = [
            (10.0, 100, 0),
            (11.0, 100, 0),
            (20.0, 200, 1),
            (30.0, 300, 2),
            (100.0, 300, 2),
        ];
        for (value, points, tier) in cases {
            let mut c = options_card();
            assert_eq!(
                apply(&mut c, 0, value),
                CardAdvance::Rewarded(award(points)),
                "value {value}"
            );
            assert_eq!(c.done, 1);
            assert_eq!(c.history, vec![tier]);
        }
    }

    #[test]
    fn options_history_accumulates_per_completion() {
        let mut c = options_card();
        apply(&mut c, 0, 25.0);
        apply(&mut c, 0, 100.0);
        apply(&mut c, 0, 10.0);

        assert_eq!(c.done, 3);
        assert_eq!(c.history, vec![1, 2, 0]);
    }

    #[test]
    fn placement_pool_tags() {
        let daily = Placement::Daily;
        let chained = Placement::Const { chain_name: "streak".into(), chain_order: 2 };
        assert_eq!(daily.pool(), PoolKind::Daily);
        assert_eq!(chained.pool(), PoolKind::Const);
        assert_eq!(chained.chain(), Some(("streak", 2)));
        assert_eq!(daily.chain(), None);
    }
}
