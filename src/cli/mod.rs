pub mod holdings;
pub mod quote;
pub mod setup;
pub mod summary;
pub mod ui;
