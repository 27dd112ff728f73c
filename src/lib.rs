pub mod config;
pub mod query;
pub mod snapshot;
pub mod source;
pub mod tui;
