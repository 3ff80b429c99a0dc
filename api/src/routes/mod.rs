pub mod dialogue;
pub mod health;
pub mod session;
pub mod summary;
