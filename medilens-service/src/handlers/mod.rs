pub mod chat;
pub mod facilities;
pub mod health;
pub mod image;
