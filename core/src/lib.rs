pub mod error;
pub mod history;
pub mod rulebook;
pub mod summary;
pub mod variant;
