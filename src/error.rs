use thiserror::Error;

/// Kind of config-store resource, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Secret,
    ConfigMap,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Secret => write!(f, "secret"),
            Resource::ConfigMap => write!(f, "config map"),
        }
    }
}

/// Fatal failures of a setup run. These abort the run and are not retried.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("could not read {resource} {namespace}/{name}")]
    Lookup {
        resource: Resource,
        name: String,
        namespace: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{resource} {namespace}/{name} has no usable {field}")]
    MissingField {
        resource: Resource,
        name: String,
        namespace: String,
        field: String,
    },

    #[error("could not write secret {namespace}/{name}")]
    Persist {
        name: String,
        namespace: String,
        #[source]
        source: anyhow::Error,
    },
}

/// A page load that failed twice in a row.
#[derive(Debug, Error)]
#[error("could not navigate to {url}")]
pub struct NavigationError {
    pub url: String,
    #[source]
    pub source: anyhow::Error,
}
