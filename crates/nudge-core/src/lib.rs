pub mod alert;
pub mod capture;
pub mod config;
pub mod extract;
pub mod watcher;

pub use config::Config;
pub use watcher::{CycleOutcome, Watcher};
