use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use simplelog::*;

#[cfg(test)]
use mockall::automock;

use super::password::generate_password;
use super::snapshots::Snapshots;
use crate::configparser::Settings;
use crate::error::NavigationError;

/// The browser operations the wizards need.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WebSession: Send + Sync {
    /// Load a page and wait for the navigation to finish.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Wait until an element matching `selector` is on the page.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    async fn focus(&self, selector: &str) -> Result<()>;

    /// Type into whatever element has focus.
    async fn type_text(&self, text: &str) -> Result<()>;

    async fn press_key(&self, key: &str) -> Result<()>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Run a script in the page and return its value.
    async fn evaluate(&self, script: &str) -> Result<Value>;

    /// PNG screenshot of the viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Shut the browser down. Later calls on the session fail.
    async fn close(&self) -> Result<()>;
}

/// Starts browser sessions.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn WebSession>>;
}

/// Load `url`, retrying exactly once after `delay` if the first attempt fails.
pub async fn goto_with_retry(
    session: &dyn WebSession,
    url: &str,
    delay: Duration,
) -> Result<(), NavigationError> {
    if let Err(e) = session.goto(url).await {
        warn!("could not load {url} ({e:#}), retrying in {delay:?}");
        tokio::time::sleep(delay).await;

        session.goto(url).await.map_err(|source| NavigationError {
            url: url.to_string(),
            source,
        })?;
    }

    Ok(())
}

/// Shared helpers for wizard steps: readiness waits, retrying navigation,
/// debug screenshots.
pub struct WizardContext<'a> {
    pub session: &'a dyn WebSession,
    pub settings: &'a Settings,
    snapshots: &'a Snapshots,
}

impl<'a> WizardContext<'a> {
    pub fn new(session: &'a dyn WebSession, settings: &'a Settings, snapshots: &'a Snapshots) -> Self {
        Self {
            session,
            settings,
            snapshots,
        }
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        goto_with_retry(self.session, url, self.settings.timing.retry_delay()).await?;
        Ok(())
    }

    /// Give the page a moment between steps.
    pub async fn settle(&self) {
        tokio::time::sleep(self.settings.timing.settle()).await;
    }

    pub async fn wait_for(&self, selector: &str) -> Result<()> {
        self.session
            .wait_for(selector, self.settings.timing.readiness_timeout())
            .await
    }

    pub async fn snapshot(&self, title: &str) {
        self.snapshots.capture(self.session, title).await;
    }

    /// Focus the element and type `text` into it.
    pub async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        self.wait_for(selector).await?;
        self.session.focus(selector).await?;
        self.session.type_text(text).await
    }

    pub async fn click(&self, selector: &str) -> Result<()> {
        self.wait_for(selector).await?;
        self.session.click(selector).await
    }

    /// Click the `index`th element matching `selector`, for buttons that
    /// cannot be told apart by selector alone.
    pub async fn click_nth(&self, selector: &str, index: usize) -> Result<()> {
        self.wait_for(selector).await?;
        let clicked = self
            .session
            .evaluate(&format!(
                "(() => {{ const e = document.querySelectorAll({sel}).item({index}); if (!e) return false; e.click(); return true; }})()",
                sel = js_string(selector),
            ))
            .await?;

        match clicked {
            Value::Bool(true) => Ok(()),
            _ => anyhow::bail!("no element {index} matching {selector}"),
        }
    }

    /// Inner text of the first element matching `selector`, if any.
    pub async fn text_of(&self, selector: &str) -> Result<Option<String>> {
        let value = self
            .session
            .evaluate(&format!(
                "document.querySelector({})?.innerText",
                js_string(selector)
            ))
            .await?;
        Ok(value.as_str().map(|s| s.trim().to_string()))
    }

    /// Log the heading of the page we are on, to follow along in the logs.
    pub async fn log_page(&self, selector: &str) {
        match self.text_of(selector).await {
            Ok(Some(title)) => info!("On page: {title}"),
            Ok(None) => debug!("no page title at {selector}"),
            Err(e) => debug!("could not read page title: {e:#}"),
        }
    }

    pub fn generate_password(&self) -> String {
        generate_password(self.settings.password_length)
    }
}

/// Quote a value for use as a javascript string literal.
pub fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}
