// File: questdeck-core/src/services/mod.rs

pub mod card_service;
pub mod user_service;

pub use card_service::{CardCompletion, CardService, TemplateDraft};
pub use user_service::UserService;
