use anyhow::Result;
use simplelog::*;

use crate::clients::KubeBackend;
use crate::error::{Resource, SetupError};
use crate::service::{Credentials, LocatedService, ServiceEndpoint, ServiceSpec};
use crate::store::{config_map_strings, secret_field, ConfigStore};

/// Find the url and current credentials for a tool.
///
/// Credentials always come from the secret. When running in-cluster and the
/// secret carries its own url, that (cluster-internal) url is used to reach
/// the tool; otherwise the config map url is used for everything. The config
/// map url is always exposed as the public url.
pub async fn locate(
    store: &dyn ConfigStore,
    spec: &ServiceSpec,
    namespace: &str,
    backend: KubeBackend,
) -> Result<LocatedService> {
    let secret = store
        .secret(spec.secret_name, namespace)
        .await
        .map_err(lookup_error(Resource::Secret, spec.secret_name, namespace))?;
    // only the fields we need are decoded, anything else in there is opaque
    let field = |key: String| {
        secret_field(&secret, &key)
            .map(non_empty)
            .map_err(lookup_error(Resource::Secret, spec.secret_name, namespace))
    };
    let credentials = Credentials {
        username: field(spec.user_key())?,
        password: field(spec.password_key())?,
    };
    let secret_url = field(spec.url_key())?;

    let config_map = store
        .config_map(spec.config_map_name, namespace)
        .await
        .map_err(lookup_error(Resource::ConfigMap, spec.config_map_name, namespace))?;
    let public_url = non_empty(config_map_strings(&config_map).remove(&spec.url_key()));

    let endpoint = match (backend.is_in_cluster(), secret_url, public_url) {
        (true, Some(url), Some(public_url)) => ServiceEndpoint { url, public_url },
        (true, Some(url), None) => {
            warn!(
                "config map {} has no {}, using the in-cluster url as public url",
                spec.config_map_name,
                spec.url_key()
            );
            ServiceEndpoint {
                public_url: url.clone(),
                url,
            }
        }
        (_, _, Some(public_url)) => ServiceEndpoint {
            url: public_url.clone(),
            public_url,
        },
        (_, _, None) => {
            return Err(SetupError::MissingField {
                resource: Resource::ConfigMap,
                name: spec.config_map_name.to_string(),
                namespace: namespace.to_string(),
                field: spec.url_key(),
            }
            .into())
        }
    };

    debug!("resolved endpoint {endpoint:?} ({backend:?} backend)");

    Ok(LocatedService {
        endpoint,
        credentials,
    })
}

fn lookup_error(
    resource: Resource,
    name: &str,
    namespace: &str,
) -> impl FnOnce(anyhow::Error) -> SetupError {
    let (name, namespace) = (name.to_string(), namespace.to_string());
    move |source| SetupError::Lookup {
        resource,
        name,
        namespace,
        source,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
