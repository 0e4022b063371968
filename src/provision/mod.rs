//! Scripted browser sessions that walk a tool through its first-run wizard.
//!
//! Each tool is a [`Provisioner`]: a fixed, linear list of wizard steps run
//! against a [`WebSession`]. [`drive`] owns the session lifecycle: it
//! launches the browser, runs the steps, and closes the browser again no
//! matter how the steps ended.

use async_trait::async_trait;
use simplelog::*;
use thiserror::Error;

use crate::configparser::Settings;
use crate::service::LocatedService;

pub mod artifactory;
pub mod chrome;
pub mod password;
pub mod session;
pub mod snapshots;
pub mod sonarqube;

pub use crate::service::ServiceKind;
pub use artifactory::Artifactory;
pub use chrome::ChromeLauncher;
pub use password::generate_password;
pub use session::{goto_with_retry, Launcher, WebSession, WizardContext};
pub use snapshots::Snapshots;
pub use sonarqube::Sonarqube;

/// Whatever a wizard run managed to produce.
///
/// A missing `new_password` means no rotation happened, which is not an
/// error by itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisioningResult {
    pub new_password: Option<String>,
    pub new_token: Option<String>,
    pub encrypted_password: Option<String>,
    pub error_message: Option<String>,
    /// rendered cause chain of the failure, if the run failed
    pub error: Option<String>,
}

/// A wizard run that failed part way through.
///
/// `result` holds everything captured before the failure, and always has
/// `error_message` and `error` filled in.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProvisioningError {
    pub message: String,
    pub result: ProvisioningResult,
    #[source]
    pub cause: anyhow::Error,
}

impl ProvisioningError {
    pub fn new(message: impl Into<String>, mut result: ProvisioningResult, cause: anyhow::Error) -> Self {
        let message = message.into();

        if result.error_message.as_deref().map_or(true, str::is_empty) {
            result.error_message = Some(message.clone());
        }
        if result.error.as_deref().map_or(true, str::is_empty) {
            let rendered = format!("{cause:#}");
            result.error = Some(match rendered.trim().is_empty() {
                true => message.clone(),
                false => rendered,
            });
        }

        Self {
            message,
            result,
            cause,
        }
    }
}

/// One tool's setup wizard.
#[async_trait]
pub trait Provisioner: Send + Sync {
    fn kind(&self) -> ServiceKind;

    /// Walk through the wizard, recording into `result` as soon as each
    /// value is obtained so that a later failure does not lose it.
    async fn run(
        &self,
        cx: &WizardContext<'_>,
        target: &LocatedService,
        result: &mut ProvisioningResult,
    ) -> anyhow::Result<()>;
}

/// Pick the wizard for a tool.
pub fn provisioner_for(kind: ServiceKind) -> Box<dyn Provisioner> {
    match kind {
        ServiceKind::Artifactory => Box::new(Artifactory),
        ServiceKind::Sonarqube => Box::new(Sonarqube),
    }
}

/// Launch a browser, run the provisioner in it, and always close it again.
pub async fn drive(
    provisioner: &dyn Provisioner,
    launcher: &dyn Launcher,
    target: &LocatedService,
    settings: &Settings,
    snapshots: &Snapshots,
) -> Result<ProvisioningResult, ProvisioningError> {
    let message = format!("Error setting up {}", provisioner.kind());
    let mut result = ProvisioningResult::default();

    debug!("{}: Launch", provisioner.kind());
    let session = match launcher.launch().await {
        Ok(s) => s,
        Err(e) => {
            return Err(ProvisioningError::new(
                message,
                result,
                e.context("could not launch browser"),
            ))
        }
    };

    let cx = WizardContext::new(session.as_ref(), settings, snapshots);
    let outcome = provisioner.run(&cx, target, &mut result).await;

    if let Err(e) = session.close().await {
        warn!("could not close browser: {e:#}");
    }

    match outcome {
        Ok(()) => {
            debug!("{}: Done", provisioner.kind());
            Ok(result)
        }
        Err(cause) => Err(ProvisioningError::new(message, result, cause)),
    }
}
