pub mod cli;
pub mod clients;
pub mod commands;
pub mod configparser;
pub mod error;
pub mod locator;
pub mod orchestrator;
pub mod persister;
pub mod provision;
pub mod service;
pub mod store;
pub mod utils;

#[cfg(test)]
mod tests;
