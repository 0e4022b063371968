use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use simplelog::*;

use super::session::WebSession;

/// Numbered debug screenshots, taken at wizard step boundaries.
///
/// Files are written as `<dir>/<n>-<title>.png`. When disabled, capturing
/// does nothing.
pub struct Snapshots {
    dir: Option<PathBuf>,
    counter: AtomicUsize,
}

impl Snapshots {
    pub fn new(dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            dir: enabled.then(|| dir.into()),
            counter: AtomicUsize::new(0),
        }
    }

    pub fn disabled() -> Self {
        Self {
            dir: None,
            counter: AtomicUsize::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// Take a screenshot. Failures are logged and otherwise ignored.
    pub async fn capture(&self, session: &dyn WebSession, title: &str) {
        let Some(dir) = &self.dir else {
            return;
        };

        match self.try_capture(session, dir, title).await {
            Ok(path) => debug!("saved screenshot {}", path.display()),
            Err(e) => warn!("could not capture screenshot {title}: {e:#}"),
        }
    }

    async fn try_capture(&self, session: &dyn WebSession, dir: &Path, title: &str) -> Result<PathBuf> {
        let png = session.screenshot().await?;

        fs::create_dir_all(dir)
            .with_context(|| format!("could not create {}", dir.display()))?;

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let path = dir.join(format!("{n}-{title}.png"));
        fs::write(&path, png).with_context(|| format!("could not write {}", path.display()))?;

        Ok(path)
    }
}
