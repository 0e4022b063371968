// Builders for the Kubernetes client, depending on where we are running.

use anyhow::{Context, Result};
use kube;
use simplelog::*;

/// Where Kubernetes credentials come from for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KubeBackend {
    /// service account token mounted into the pod
    InCluster,
    /// local kubeconfig (KUBECONFIG or ~/.kube/config)
    Default,
}

impl KubeBackend {
    pub fn from_flag(in_cluster: bool) -> Self {
        match in_cluster {
            true => KubeBackend::InCluster,
            false => KubeBackend::Default,
        }
    }

    pub fn is_in_cluster(&self) -> bool {
        matches!(self, KubeBackend::InCluster)
    }
}

/// Returns Kubernetes Client for the selected backend
pub async fn kube_client(backend: KubeBackend) -> Result<kube::Client> {
    debug!("building kube client ({backend:?} backend)");

    let client_config = match backend {
        KubeBackend::InCluster => {
            kube::Config::incluster().context("could not load in-cluster kube config")?
        }
        KubeBackend::Default => kube::Config::from_kubeconfig(&Default::default())
            .await
            .context("could not load kubeconfig")?,
    };

    // client::try_from returns a Result, but the Error is not compatible
    // with anyhow::Error, so assign this with ? and return Ok() separately
    let client = kube::Client::try_from(client_config)?;
    Ok(client)
}
