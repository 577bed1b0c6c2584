// File: questdeck-common/src/models/mod.rs
pub mod card;
pub mod user;

pub use card::{Award, Card, CardKind, CardTemplate, OptionTier, Placement, PoolKind};
pub use user::{User, UserPrize};
