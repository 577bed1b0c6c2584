// File: questdeck-core/src/engine/views.rs

use questdeck_common::models::card::{Card, CardKind};

/// One completed showing of a card. A card with `done = 3` appears three
/// times, and an options card carries the tier index it granted on that
/// particular completion.
#[derive(Debug, Clone, PartialEq)]
pub struct DoneCard {
    pub card: Card,
    pub option_tier: Option<i32>,
}

/// A user's cards split for display.
#[derive(Debug, Clone, Default)]
pub struct UserCards {
    pub pending: Vec<Card>,
    pub done: Vec<DoneCard>,
}

/// Partitions a user's cards into pending and done views.
///
/// Daily cards split one-to-one on whether they ever completed. Const
/// cards are grouped into chains (`chained` must arrive sorted by chain
/// name then chain order, which is the store's list contract) and each
/// chain contributes exactly one pending representative: the first link
/// not yet completed, or the final link once the whole chain is done.
pub fn partition_cards(daily: Vec<Card>, chained: Vec<Card>) -> UserCards {
    let mut pending = Vec::new();
    let mut done = Vec::new();

    // daily cards are one entry each either way; only const chains
    // explode repetitions
    for card in daily {
        if card.done == 0 {
            pending.push(card);
        } else {
            done.push(DoneCard { card, option_tier: None });
        }
    }

    let mut start = 0;
    while start < chained.len() {
        let name = chain_name(&chained[start]);
        let mut end = start + 1;
        while end < chained.len() && chain_name(&chained[end]) == name {
            end += 1;
        }
        let chain = &chained[start..end];

        // every completion anywhere in the chain shows in the done list
        for card in chain {
            if card.done > 0 {
                explode_done(&mut done, card);
            }
        }

        let rep = chain.iter().find(|c| c.done == 0).or_else(|| chain.last());
        if let Some(rep) = rep {
            pending.push(rep.clone());
        }

        start = end;
    }

    UserCards { pending, done }
}

fn chain_name(card: &Card) -> &str {
    card.template.placement.chain().map(|(name, _)| name).unwrap_or("")
}

/// Pushes one done entry per completed repetition of `card`.
fn explode_done(done: &mut Vec<DoneCard>, card: &Card) {
    let is_options = matches!(card.template.kind, CardKind::Options { .. });
    for i in 0..card.done {
        let option_tier = if is_options {
            card.history.get(i as usize).copied()
        } else {
            None
        };
        done.push(DoneCard { card: card.clone(), option_tier });
    }
}
