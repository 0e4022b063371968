//! The tools this crate knows how to set up, and where their settings live.

use std::fmt;

/// Which tool a run is targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Artifactory,
    Sonarqube,
}

impl ServiceKind {
    pub fn spec(&self) -> &'static ServiceSpec {
        match self {
            ServiceKind::Artifactory => &ARTIFACTORY,
            ServiceKind::Sonarqube => &SONARQUBE,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Artifactory => write!(f, "Artifactory"),
            ServiceKind::Sonarqube => write!(f, "SonarQube"),
        }
    }
}

/// Names of the secret and config map holding a tool's endpoint and
/// credentials, and the prefix of their field names.
#[derive(Debug, PartialEq, Eq)]
pub struct ServiceSpec {
    pub secret_name: &'static str,
    pub config_map_name: &'static str,
    pub prefix: &'static str,
    /// whether the secret also carries an `<PREFIX>_ENCRYPT` field
    pub has_encrypted_password: bool,
}

pub static ARTIFACTORY: ServiceSpec = ServiceSpec {
    secret_name: "artifactory-access",
    config_map_name: "artifactory-config",
    prefix: "ARTIFACTORY",
    has_encrypted_password: true,
};

pub static SONARQUBE: ServiceSpec = ServiceSpec {
    secret_name: "sonarqube-access",
    config_map_name: "sonarqube-config",
    prefix: "SONARQUBE",
    has_encrypted_password: false,
};

impl ServiceSpec {
    pub fn url_key(&self) -> String {
        format!("{}_URL", self.prefix)
    }

    pub fn user_key(&self) -> String {
        format!("{}_USER", self.prefix)
    }

    pub fn password_key(&self) -> String {
        format!("{}_PASSWORD", self.prefix)
    }

    pub fn encrypt_key(&self) -> Option<String> {
        self.has_encrypted_password
            .then(|| format!("{}_ENCRYPT", self.prefix))
    }
}

/// Where a tool can be reached.
///
/// `url` is what this process talks to; `public_url` is what users outside
/// the cluster use. They only differ when running in-cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub url: String,
    pub public_url: String,
}

/// Current admin identity, used on the tool's own login page.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

// never print the password itself
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field(
                "password",
                &match self.password.as_deref() {
                    Some(p) if !p.is_empty() => "xxxx",
                    _ => "",
                },
            )
            .finish()
    }
}

/// Output of the credential lookup: endpoint plus bootstrap credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedService {
    pub endpoint: ServiceEndpoint,
    pub credentials: Credentials,
}
