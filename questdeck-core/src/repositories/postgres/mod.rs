// src/repositories/postgres/mod.rs

pub mod cards;
pub mod prizes;
pub mod users;

pub use cards::PostgresCardRepository;
pub use prizes::PostgresPrizeRepository;
pub use users::PostgresUserRepository;
