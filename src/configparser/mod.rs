pub mod config;

pub use config::{parse, BrowserSettings, Settings, TimingSettings};
