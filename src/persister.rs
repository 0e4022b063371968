use std::collections::BTreeMap;

use anyhow::Result;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use simplelog::*;

use crate::error::{Resource, SetupError};
use crate::provision::ProvisioningResult;
use crate::service::ServiceSpec;
use crate::store::ConfigStore;

/// Write newly obtained credentials back into the tool's secret.
///
/// Does nothing when the run did not produce a new password. Otherwise the
/// secret is read, the password (and encrypted password, for tools that have
/// one) overlaid, and the whole secret written back; all other fields are
/// kept as they were. Returns whether a write happened.
pub async fn persist(
    store: &dyn ConfigStore,
    spec: &ServiceSpec,
    namespace: &str,
    result: &ProvisioningResult,
) -> Result<bool> {
    if result.new_password.is_none() {
        debug!("no new password, leaving secret {namespace}/{} alone", spec.secret_name);
        return Ok(false);
    }

    let secret = store
        .secret(spec.secret_name, namespace)
        .await
        .map_err(|source| SetupError::Lookup {
            resource: Resource::Secret,
            name: spec.secret_name.to_string(),
            namespace: namespace.to_string(),
            source,
        })?;

    let data = overlay_secret_data(secret.data.clone().unwrap_or_default(), spec, result);
    debug!(
        "writing fields {:?} to secret {namespace}/{}",
        data.keys().collect::<Vec<_>>(),
        spec.secret_name
    );
    let updated = Secret {
        data: Some(data),
        ..secret
    };

    store
        .replace_secret(spec.secret_name, namespace, &updated)
        .await
        .map_err(|source| SetupError::Persist {
            name: spec.secret_name.to_string(),
            namespace: namespace.to_string(),
            source,
        })?;

    Ok(true)
}

/// Overlay the new credentials onto existing secret data.
///
/// Values are raw bytes here; the API layer base64-encodes them.
pub fn overlay_secret_data(
    mut data: BTreeMap<String, ByteString>,
    spec: &ServiceSpec,
    result: &ProvisioningResult,
) -> BTreeMap<String, ByteString> {
    if let Some(password) = &result.new_password {
        data.insert(spec.password_key(), ByteString(password.as_bytes().to_vec()));
    }

    if let (Some(key), Some(encrypted)) = (spec.encrypt_key(), &result.encrypted_password) {
        data.insert(key, ByteString(encrypted.as_bytes().to_vec()));
    }

    data
}
