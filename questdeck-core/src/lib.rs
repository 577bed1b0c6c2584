// src/lib.rs

pub mod db;
pub mod engine;
pub mod repositories;
pub mod services;
pub mod tasks;

pub use db::Database;
pub use questdeck_common::error::Error;
