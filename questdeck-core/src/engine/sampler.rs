// File: questdeck-core/src/engine/sampler.rs

use std::collections::HashSet;

use rand::Rng;
use questdeck_common::models::card::CardTemplate;

/// Draws `count` templates from `pool` uniformly, without replacement.
///
/// With `distinct_goals` set, no two drawn templates may share a goal tag.
/// Returns an empty vec when the request cannot be satisfied at all; a
/// partial hand is never returned. The RNG comes from the caller so tests
/// can seed it.
pub fn draw_templates<R: Rng + ?Sized>(
    rng: &mut R,
    pool: &[CardTemplate],
    count: usize,
    distinct_goals: bool,
) -> Vec<CardTemplate> {
    if pool.len() < count {
        return Vec::new();
    }
    if distinct_goals {
        // checked up front so the rejection loop below cannot spin forever
        let goals: HashSet<&str> = pool.iter().map(|t| t.goal.as_str()).collect();
        if goals.len() < count {
            return Vec::new();
        }
    }

    let mut taken_idx: HashSet<usize> = HashSet::new();
    let mut taken_goals: HashSet<String> = HashSet::new();
    let mut hand = Vec::with_capacity(count);

    while hand.len() < count {
        let i = rng.random_range(0..pool.len());
        if !taken_idx.insert(i) {
            continue;
        }
        if distinct_goals && !taken_goals.insert(pool[i].goal.clone()) {
            continue;
        }
        hand.push(pool[i].clone());
    }
    hand
}
