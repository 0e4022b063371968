use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

#[derive(Parser, Debug)]
/// First-run setup for the developer tools deployed in a Kubernetes cluster.
///
/// Drives each tool's setup wizard in a headless browser and writes the
/// resulting credentials back into the tool's Kubernetes secret.
pub struct Cli {
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sets up the Artifactory instance for usage in the cluster.
    ///
    /// Completes the welcome wizard, rotates the admin password, enables
    /// anonymous access and stores the new (and encrypted) password.
    SetupArtifactory(SetupArgs),

    /// Resets the password for the SonarQube instance.
    SetupSonarqube(SetupArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SetupArgs {
    #[arg(
        short,
        long,
        value_name = "NAMESPACE",
        help = "namespace where the tool's secret and config map have been created",
        default_value = "tools"
    )]
    pub namespace: String,

    #[arg(
        long = "inCluster",
        visible_alias = "in-cluster",
        help = "run from a pod in the cluster (impacts kube configuration and which url to use)"
    )]
    pub in_cluster: bool,

    #[arg(long, help = "turn on debug logging and screenshots")]
    pub debug: bool,
}

impl Commands {
    pub fn args(&self) -> &SetupArgs {
        match self {
            Commands::SetupArtifactory(args) | Commands::SetupSonarqube(args) => args,
        }
    }
}
