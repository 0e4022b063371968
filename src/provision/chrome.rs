//! [`WebSession`] over a headless Chrome, driven through the DevTools protocol.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use simplelog::*;

use super::session::{Launcher, WebSession};
use crate::configparser::BrowserSettings;

/// Launches a fresh Chrome for every session.
pub struct ChromeLauncher {
    config: BrowserSettings,
}

impl ChromeLauncher {
    pub fn new(config: BrowserSettings) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Launcher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn WebSession>> {
        Ok(Box::new(ChromeSession::launch(&self.config)?))
    }
}

/// A running browser and the tab the wizard runs in.
pub struct ChromeSession {
    // taken out on close, dropping it kills the browser process
    browser: Mutex<Option<Browser>>,
    tab: Arc<Tab>,
}

impl ChromeSession {
    pub fn launch(config: &BrowserSettings) -> Result<Self> {
        info!(
            "launching browser (headless: {}, size: {}x{})",
            config.headless, config.width, config.height
        );

        // the tools are usually served with self-signed certificates, and
        // chrome's sandbox does not work when running as root in a pod
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .ignore_certificate_errors(true)
            .window_size(Some((config.width, config.height)))
            .path(config.chrome_path.clone())
            .build()
            .map_err(|e| anyhow!("invalid browser launch options: {e}"))?;

        let browser = Browser::new(options).context("could not launch browser")?;
        let tab = browser.new_tab().context("could not open browser tab")?;
        tab.set_default_timeout(Duration::from_secs(config.navigation_timeout_secs));

        debug!("browser launched");

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            tab,
        })
    }
}

#[async_trait]
impl WebSession for ChromeSession {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!("navigating to {url}");
        self.tab
            .navigate_to(url)
            .with_context(|| format!("could not navigate to {url}"))?
            .wait_until_navigated()
            .with_context(|| format!("navigation to {url} did not finish"))?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        trace!("waiting for {selector}");
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .with_context(|| format!("element {selector} did not show up within {timeout:?}"))?;
        Ok(())
    }

    async fn focus(&self, selector: &str) -> Result<()> {
        self.tab
            .find_element(selector)?
            .focus()
            .with_context(|| format!("could not focus {selector}"))?;
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        self.tab.type_str(text).context("could not type text")?;
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        self.tab
            .press_key(key)
            .with_context(|| format!("could not press {key}"))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        trace!("clicking {selector}");
        self.tab
            .find_element(selector)?
            .click()
            .with_context(|| format!("could not click {selector}"))?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        let result = self
            .tab
            .evaluate(script, false)
            .context("script evaluation failed")?;
        Ok(result.value.unwrap_or(Value::Null))
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .context("could not capture screenshot")
    }

    async fn close(&self) -> Result<()> {
        let browser = self
            .browser
            .lock()
            .map_err(|_| anyhow!("browser lock poisoned"))?
            .take();

        if let Some(browser) = browser {
            info!("closing browser");
            if let Err(e) = self.tab.close(true) {
                debug!("could not close tab: {e:#}");
            }
            drop(browser);
        }
        Ok(())
    }
}
