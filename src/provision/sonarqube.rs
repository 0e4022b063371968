//! SonarQube token generation and admin password rotation.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use simplelog::*;

use super::session::WizardContext;
use super::{ProvisioningResult, Provisioner, ServiceKind};
use crate::service::LocatedService;
use crate::utils::mask_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SonarqubeStep {
    Login,
    GenerateToken,
    RotatePassword,
}

impl SonarqubeStep {
    pub const ORDER: [SonarqubeStep; 3] = [
        SonarqubeStep::Login,
        SonarqubeStep::GenerateToken,
        SonarqubeStep::RotatePassword,
    ];
}

impl fmt::Display for SonarqubeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub struct Sonarqube;

#[async_trait]
impl Provisioner for Sonarqube {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Sonarqube
    }

    async fn run(
        &self,
        cx: &WizardContext<'_>,
        target: &LocatedService,
        result: &mut ProvisioningResult,
    ) -> Result<()> {
        for step in SonarqubeStep::ORDER {
            debug!("SonarQube: {step}");
            self.step(step, cx, target, result)
                .await
                .with_context(|| format!("SonarQube step {step} failed"))?;
        }
        Ok(())
    }
}

impl Sonarqube {
    async fn step(
        &self,
        step: SonarqubeStep,
        cx: &WizardContext<'_>,
        target: &LocatedService,
        result: &mut ProvisioningResult,
    ) -> Result<()> {
        let url = target.endpoint.url.trim_end_matches('/');
        let security_url = format!("{url}/account/security/");
        let password = target
            .credentials
            .password
            .as_deref()
            .ok_or_else(|| anyhow!("no admin password available"))?;

        match step {
            SonarqubeStep::Login => {
                let login_url = format!("{url}/sessions/new");
                info!("Logging into SonarQube: {login_url}");

                let username = target
                    .credentials
                    .username
                    .as_deref()
                    .ok_or_else(|| anyhow!("no admin username available"))?;

                cx.goto(&login_url).await?;
                cx.settle().await;
                cx.snapshot("login-before").await;

                cx.fill("input[name=login]", username).await?;
                cx.fill("input[name=password]", password).await?;
                cx.snapshot("login-after").await;

                cx.click("button[type=submit]").await?;
                cx.settle().await;
            }

            SonarqubeStep::GenerateToken => {
                info!("Generating token: {security_url}");

                cx.goto(&security_url).await?;
                cx.settle().await;
                cx.snapshot("generate-token-before").await;

                let token_name = token_name(&cx.settings.token_prefix);
                cx.fill("#generate-token-form input", &token_name).await?;
                cx.snapshot("generate-token-mid").await;

                cx.click("#generate-token-form button").await?;
                cx.wait_for("code.text-success").await?;
                cx.snapshot("generate-token-after").await;

                let token = cx
                    .text_of("code.text-success")
                    .await?
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| anyhow!("generated token was not shown"))?;

                debug!("Generated token: {}", mask_value(&token));
                result.new_token = Some(token);
            }

            SonarqubeStep::RotatePassword => {
                info!("Changing password: {security_url}");

                cx.goto(&security_url).await?;
                cx.settle().await;
                cx.snapshot("set-password-before").await;

                let new_password = cx.generate_password();

                cx.fill("input[name=old_password]", password).await?;
                cx.fill("input[name=password]", &new_password).await?;
                cx.fill("input[name=password_confirmation]", &new_password)
                    .await?;
                cx.snapshot("set-password-after").await;

                cx.click("#change-password").await?;
                result.new_password = Some(new_password);
            }
        }

        Ok(())
    }
}

/// `<prefix>-<unix millis in hex>`, unique enough per run.
fn token_name(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{prefix}-{millis:x}")
}
