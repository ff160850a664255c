// Public API for integration tests and the binary

pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod loadout;
pub mod match_runner;
pub mod overlay;
pub mod server;
pub mod state;
pub mod types;
pub mod watcher;

#[cfg(test)]
mod test_support;
