//! Read/write access to the secret and config map backing each tool.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::ByteString;

#[cfg(test)]
use mockall::automock;

pub mod cluster;

pub use cluster::KubeStore;

/// Key/value resources addressed by name and namespace.
///
/// Implemented over the Kubernetes API by [`KubeStore`]; mocked in tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetch a secret. A missing secret is an error.
    async fn secret(&self, name: &str, namespace: &str) -> Result<Secret>;

    /// Fetch a config map. A missing config map is an error.
    async fn config_map(&self, name: &str, namespace: &str) -> Result<ConfigMap>;

    /// Write back a secret previously read with [`ConfigStore::secret`].
    async fn replace_secret(&self, name: &str, namespace: &str, secret: &Secret) -> Result<()>;
}

/// Decode one data field of a secret as a utf-8 string.
///
/// Other fields are left alone, they may well be binary. A secret without
/// any data has no fields.
pub fn secret_field(secret: &Secret, key: &str) -> Result<Option<String>> {
    secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .map(|ByteString(bytes)| {
            String::from_utf8(bytes.clone())
                .with_context(|| format!("secret field {key} is not valid utf-8"))
        })
        .transpose()
}

/// Data fields of a config map; a config map without data is treated as empty.
pub fn config_map_strings(config_map: &ConfigMap) -> BTreeMap<String, String> {
    config_map.data.clone().unwrap_or_default()
}
