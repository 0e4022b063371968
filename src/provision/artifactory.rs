//! Artifactory welcome wizard, anonymous access, and encrypted password.

use std::fmt;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use simplelog::*;

use super::session::WizardContext;
use super::{ProvisioningResult, Provisioner, ServiceKind};
use crate::service::LocatedService;

/// Wizard steps, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactoryStep {
    Login,
    AcknowledgeWelcome,
    ResetAdminPassword,
    SetBaseUrl,
    SkipProxyConfig,
    SelectRepositories,
    FinishWizard,
    EnableAnonymousAccess,
    RetrieveEncryptedPassword,
}

impl ArtifactoryStep {
    pub const ORDER: [ArtifactoryStep; 9] = [
        ArtifactoryStep::Login,
        ArtifactoryStep::AcknowledgeWelcome,
        ArtifactoryStep::ResetAdminPassword,
        ArtifactoryStep::SetBaseUrl,
        ArtifactoryStep::SkipProxyConfig,
        ArtifactoryStep::SelectRepositories,
        ArtifactoryStep::FinishWizard,
        ArtifactoryStep::EnableAnonymousAccess,
        ArtifactoryStep::RetrieveEncryptedPassword,
    ];
}

impl fmt::Display for ArtifactoryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const STEP_TITLE: &str = ".step-wrapper .title";
const PRIMARY_BUTTON: &str = "button.el-button--primary";

pub struct Artifactory;

#[async_trait]
impl Provisioner for Artifactory {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Artifactory
    }

    async fn run(
        &self,
        cx: &WizardContext<'_>,
        target: &LocatedService,
        result: &mut ProvisioningResult,
    ) -> Result<()> {
        for step in ArtifactoryStep::ORDER {
            debug!("Artifactory: {step}");
            self.step(step, cx, target, result)
                .await
                .with_context(|| format!("Artifactory step {step} failed"))?;
        }
        Ok(())
    }
}

impl Artifactory {
    async fn step(
        &self,
        step: ArtifactoryStep,
        cx: &WizardContext<'_>,
        target: &LocatedService,
        result: &mut ProvisioningResult,
    ) -> Result<()> {
        let url = target.endpoint.url.trim_end_matches('/');

        match step {
            ArtifactoryStep::Login => {
                let login_url = format!("{url}/ui/login");
                info!("Logging into Artifactory: {login_url}");

                let username = target
                    .credentials
                    .username
                    .as_deref()
                    .ok_or_else(|| anyhow!("no admin username available"))?;
                let password = target
                    .credentials
                    .password
                    .as_deref()
                    .ok_or_else(|| anyhow!("no admin password available"))?;

                cx.goto(&login_url).await?;
                cx.settle().await;
                cx.snapshot("login-before").await;

                cx.fill("input[name=username]", username).await?;
                cx.fill("input[name=password]", password).await?;
                cx.snapshot("login-after").await;

                cx.click("button[type=submit]").await?;
                cx.settle().await;
            }

            ArtifactoryStep::AcknowledgeWelcome => {
                cx.wait_for(".welcome-content .primary-message").await?;
                cx.log_page(".welcome-content .primary-message").await;
                info!("Starting Artifactory wizard");

                cx.snapshot("getting-started-before").await;
                cx.click("button.get-started").await?;
                cx.settle().await;
                cx.snapshot("getting-started-after").await;
            }

            ArtifactoryStep::ResetAdminPassword => {
                cx.wait_for(STEP_TITLE).await?;
                cx.log_page(STEP_TITLE).await;
                info!("Resetting admin password");

                let new_password = cx.generate_password();

                cx.snapshot("reset-password-before").await;
                cx.fill("input[type=password]", &new_password).await?;
                cx.session.press_key("Tab").await?;
                cx.session.type_text(&new_password).await?;
                cx.snapshot("reset-password-after").await;

                cx.click(PRIMARY_BUTTON).await?;
                // submitted, from here on the old password is gone
                result.new_password = Some(new_password);
                cx.settle().await;
            }

            ArtifactoryStep::SetBaseUrl => {
                cx.wait_for(STEP_TITLE).await?;
                cx.log_page(STEP_TITLE).await;

                // the base url is what users see in links, so use the public one
                let base_url = &target.endpoint.public_url;
                info!("Setting base url: {base_url}");

                cx.snapshot("set-base-url-before").await;
                cx.fill(".base-url-wrapper input", base_url).await?;
                cx.snapshot("set-base-url-mid").await;

                cx.click(".el-footer button.el-button--primary").await?;
                cx.settle().await;
                cx.snapshot("set-base-url-after").await;
            }

            ArtifactoryStep::SkipProxyConfig => {
                cx.wait_for(STEP_TITLE).await?;
                cx.log_page(STEP_TITLE).await;
                info!("Skip configure proxy");

                cx.snapshot("configure-proxy-before").await;
                // second secondary button is "Skip"
                cx.click_nth("button.el-button--secondary", 1).await?;
                cx.settle().await;
                cx.snapshot("configure-proxy-after").await;
            }

            ArtifactoryStep::SelectRepositories => {
                cx.wait_for(STEP_TITLE).await?;
                cx.log_page(STEP_TITLE).await;
                info!("Create repositories");

                cx.snapshot("create-repositories-before").await;
                cx.session
                    .evaluate(
                        "document.querySelectorAll('input[type=checkbox]').forEach(e => e.click())",
                    )
                    .await?;
                cx.snapshot("create-repositories-mid").await;

                cx.click(PRIMARY_BUTTON).await?;
                cx.snapshot("create-repositories-after").await;
                cx.settle().await;
            }

            ArtifactoryStep::FinishWizard => {
                cx.wait_for(STEP_TITLE).await?;
                cx.log_page(STEP_TITLE).await;
                info!("Complete wizard");

                cx.snapshot("complete-wizard-before").await;
                cx.click(PRIMARY_BUTTON).await?;
                cx.settle().await;
                cx.snapshot("complete-wizard-after").await;
            }

            ArtifactoryStep::EnableAnonymousAccess => {
                let security_url = format!("{url}/ui/admin/configuration/security/general");
                info!("Setting 'Allow anonymous access': {security_url}");

                cx.goto(&security_url).await?;
                cx.settle().await;
                cx.snapshot("allow-anonymous-access-before").await;

                cx.click_nth("input[type=checkbox]", 0).await?;
                cx.snapshot("allow-anonymous-access-mid").await;

                cx.click(".main-card-content-footer button.el-button--primary")
                    .await?;
                cx.snapshot("allow-anonymous-access-after").await;
            }

            ArtifactoryStep::RetrieveEncryptedPassword => {
                let profile_url = format!("{url}/ui/admin/artifactory/user_profile");
                info!("Retrieving encrypted password: {profile_url}");

                let password = result
                    .new_password
                    .clone()
                    .ok_or_else(|| anyhow!("admin password was not reset"))?;

                cx.goto(&profile_url).await?;
                cx.settle().await;
                cx.snapshot("retrieve-encrypted-password-login-before").await;

                // unlock the profile page with the current password
                cx.fill("input[name=password]", &password).await?;
                cx.click_nth("button.btn-primary", 1).await?;
                cx.snapshot("retrieve-encrypted-password-login-after").await;
                cx.settle().await;

                cx.click("i.jf-reveal-input").await?;
                cx.snapshot("retrieve-encrypted-password-show-password").await;

                let encrypted = cx
                    .session
                    .evaluate("document.querySelector('input[name=password]')?.value")
                    .await?;
                let encrypted = encrypted
                    .as_str()
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| anyhow!("encrypted password field is empty"))?;

                result.encrypted_password = Some(encrypted.to_string());
            }
        }

        Ok(())
    }
}
