pub mod app;
pub mod config;
pub mod csv;
pub mod date;
pub mod errors;
pub mod handlers;
pub mod ids;
pub mod models;
pub mod state;
pub mod storage;
pub mod tracker;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{DayStore, JsonFileStore, MemoryStore};
pub use tracker::Tracker;
