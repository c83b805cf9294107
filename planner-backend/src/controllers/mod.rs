pub mod discover;
pub mod health;
