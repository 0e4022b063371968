use simplelog::*;
use std::process::exit;

use crate::cli::SetupArgs;
use crate::clients::KubeBackend;
use crate::configparser;
use crate::orchestrator;
use crate::provision::ServiceKind;

#[tokio::main(flavor = "current_thread")] // make this a sync function
pub async fn run(kind: ServiceKind, args: &SetupArgs) {
    info!("Configuring {kind}");

    let settings = match configparser::parse() {
        Ok(s) => s,
        Err(err) => {
            error!("{err:?}");
            exit(1);
        }
    };

    let backend = KubeBackend::from_flag(args.in_cluster);

    if let Err(err) = orchestrator::setup_service(
        kind,
        &args.namespace,
        backend,
        &settings,
        args.debug,
    )
    .await
    {
        error!("Error configuring {kind}: {err:?}");
        exit(1);
    }

    info!("{kind} configured");
}
