use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::api::{Api, PostParams};
use simplelog::*;

use super::ConfigStore;

/// [`ConfigStore`] backed by the Kubernetes API.
pub struct KubeStore {
    client: kube::Client,
}

impl KubeStore {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConfigStore for KubeStore {
    async fn secret(&self, name: &str, namespace: &str) -> Result<Secret> {
        debug!("reading secret {namespace}/{name}");
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .with_context(|| format!("could not get secret {namespace}/{name}"))
    }

    async fn config_map(&self, name: &str, namespace: &str) -> Result<ConfigMap> {
        debug!("reading config map {namespace}/{name}");
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .with_context(|| format!("could not get config map {namespace}/{name}"))
    }

    async fn replace_secret(&self, name: &str, namespace: &str, secret: &Secret) -> Result<()> {
        debug!("replacing secret {namespace}/{name}");
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);

        // the resourceVersion from the read is kept, so a concurrent change
        // makes this fail with a conflict instead of being overwritten
        match api.replace(name, &PostParams::default(), secret).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(ae)) => {
                Err(anyhow::anyhow!(ae).context("error from cluster when updating secret"))
            }
            Err(e) => Err(anyhow::anyhow!(e)).context("unknown error when updating secret"),
        }
    }
}
