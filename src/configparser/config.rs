use anyhow::{ensure, Context, Result};
use fully_pub::fully_pub;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use simplelog::*;
use std::path::PathBuf;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;

/// Optional settings file, looked up in the working directory.
pub const SETTINGS_FILE: &str = "setup-tools.yaml";
/// Prefix for environment overrides, e.g. `SETUP_TOOLS_TIMING__SETTLE_MS`.
pub const ENV_PREFIX: &str = "SETUP_TOOLS_";

/// One character from each class the generated passwords must contain.
pub const MIN_PASSWORD_LENGTH: usize = 3;

pub fn parse() -> Result<Settings> {
    debug!("trying to parse {SETTINGS_FILE}");

    // nested keys are separated by a double underscore, since most of the
    // setting names have single underscores in them already
    let env_overrides = Env::prefixed(ENV_PREFIX).split("__");
    trace!(
        "overriding settings with envvar values: {}",
        env_overrides
            .iter()
            .map(|(key, val)| format!("{}='{}'", key.string, val))
            .join(", ")
    );

    let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
        .merge(Yaml::file(SETTINGS_FILE))
        .merge(env_overrides)
        .extract()
        .with_context(|| format!("failed to parse {SETTINGS_FILE}"))?;

    trace!("got settings: {settings:#?}");

    ensure!(
        settings.password_length >= MIN_PASSWORD_LENGTH,
        "password_length must be at least {MIN_PASSWORD_LENGTH}, got {}",
        settings.password_length
    );

    Ok(settings)
}

//
// ==== Structs for setup-tools.yaml parsing ====
//

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[fully_pub]
struct Settings {
    /// where debug screenshots are written
    screenshot_dir: PathBuf,
    /// length of generated admin passwords
    password_length: usize,
    /// name prefix for generated SonarQube tokens
    token_prefix: String,
    browser: BrowserSettings,
    timing: TimingSettings,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[fully_pub]
struct BrowserSettings {
    headless: bool,
    width: u32,
    height: u32,
    chrome_path: Option<PathBuf>,
    navigation_timeout_secs: u64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[fully_pub]
struct TimingSettings {
    /// pause between wizard steps
    settle_ms: u64,
    /// pause before the single navigation retry
    retry_delay_ms: u64,
    /// upper bound when waiting for an element to show up
    readiness_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screenshot_dir: PathBuf::from("screenshots"),
            password_length: 20,
            token_prefix: "cntk".to_string(),
            browser: BrowserSettings::default(),
            timing: TimingSettings::default(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            width: 1024,
            height: 768,
            chrome_path: None,
            navigation_timeout_secs: 30,
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            settle_ms: 1000,
            retry_delay_ms: 3000,
            readiness_timeout_ms: 10_000,
        }
    }
}

impl TimingSettings {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }
}
