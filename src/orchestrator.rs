use anyhow::Result;
use simplelog::*;

use crate::clients::{kube_client, KubeBackend};
use crate::configparser::Settings;
use crate::error::{Resource, SetupError};
use crate::locator::locate;
use crate::persister::persist;
use crate::provision::{self, provisioner_for, ChromeLauncher, Launcher, Provisioner, Snapshots};
use crate::service::{LocatedService, ServiceKind};
use crate::store::{ConfigStore, KubeStore};

/// How a run ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// new credentials were written to the secret
    Updated,
    /// the wizard produced no new password (usually: already set up)
    NothingToUpdate,
}

/// Set up one tool against the real cluster and a real browser.
pub async fn setup_service(
    kind: ServiceKind,
    namespace: &str,
    backend: KubeBackend,
    settings: &Settings,
    debug: bool,
) -> Result<RunOutcome> {
    let client = kube_client(backend).await?;
    let store = KubeStore::new(client);
    let launcher = ChromeLauncher::new(settings.browser.clone());
    let snapshots = Snapshots::new(&settings.screenshot_dir, debug);

    let orchestrator = Orchestrator {
        store: &store,
        launcher: &launcher,
        settings,
        snapshots: &snapshots,
    };

    let provisioner = provisioner_for(kind);
    orchestrator
        .run(provisioner.as_ref(), namespace, backend)
        .await
}

/// Locate, provision, persist.
pub struct Orchestrator<'a> {
    pub store: &'a dyn ConfigStore,
    pub launcher: &'a dyn Launcher,
    pub settings: &'a Settings,
    pub snapshots: &'a Snapshots,
}

impl Orchestrator<'_> {
    /// Lookup and persist failures are returned. Wizard failures are not:
    /// whatever the wizard got done before failing is still persisted, since
    /// the tool may already have accepted a new password.
    pub async fn run(
        &self,
        provisioner: &dyn Provisioner,
        namespace: &str,
        backend: KubeBackend,
    ) -> Result<RunOutcome> {
        let kind = provisioner.kind();
        let spec = kind.spec();

        let target = locate(self.store, spec, namespace, backend).await?;
        info!("Retrieved {kind} config: {}", describe(&target));

        if target.credentials.username.is_none() || target.credentials.password.is_none() {
            let field = match target.credentials.username {
                None => spec.user_key(),
                Some(_) => spec.password_key(),
            };
            return Err(SetupError::MissingField {
                resource: Resource::Secret,
                name: spec.secret_name.to_string(),
                namespace: namespace.to_string(),
                field,
            }
            .into());
        }

        let result = match provision::drive(
            provisioner,
            self.launcher,
            &target,
            self.settings,
            self.snapshots,
        )
        .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("{e}, continuing with what was captured");
                debug!("{e}: {:#}", e.cause);
                debug!("partial result: {}", describe_result(&e.result));
                e.result
            }
        };

        if result.new_password.is_some() {
            info!("Updating {kind} credentials");
            persist(self.store, spec, namespace, &result).await?;
            Ok(RunOutcome::Updated)
        } else {
            info!("No credentials to update ({})", describe_result(&result));
            Ok(RunOutcome::NothingToUpdate)
        }
    }
}

fn describe(target: &LocatedService) -> String {
    format!(
        "url={}, public_url={}, username={}, password={}",
        target.endpoint.url,
        target.endpoint.public_url,
        target.credentials.username.as_deref().unwrap_or(""),
        match target.credentials.password.as_deref() {
            Some(p) if !p.is_empty() => "xxxx",
            _ => "",
        }
    )
}

// secrets only ever show up as present/absent
fn describe_result(result: &provision::ProvisioningResult) -> String {
    let present = |v: &Option<String>| if v.is_some() { "xxxx" } else { "none" };
    format!(
        "new_password={}, new_token={}, encrypted_password={}, error={}",
        present(&result.new_password),
        present(&result.new_token),
        present(&result.encrypted_password),
        result.error.as_deref().unwrap_or("none"),
    )
}
