pub mod app;
pub mod config;
pub mod core;
pub mod game;
pub mod ui;

pub use app::{LootCore, RowView, StepContext, ViewModel};
pub use config::Config;
