use clap::Parser;
use simplelog::*;

use cluster_tools_setup::cli::{Cli, Commands};
use cluster_tools_setup::commands;
use cluster_tools_setup::provision::ServiceKind;

fn main() {
    let cli = Cli::parse();

    let debug = cli.command.args().debug;
    setup_logging(&cli, debug);

    debug!("args: {:?}", cli);

    // dispatch commands
    match &cli.command {
        Commands::SetupArtifactory(args) => commands::setup::run(ServiceKind::Artifactory, args),
        Commands::SetupSonarqube(args) => commands::setup::run(ServiceKind::Sonarqube, args),
    }
}

fn setup_logging(cli: &Cli, debug: bool) {
    // --debug always wins over -q
    let log_level = match debug {
        true => LevelFilter::Debug,
        false => cli.verbose.log_level_filter(),
    };

    let log_config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Trace)
        .add_filter_ignore_str("headless_chrome")
        .add_filter_ignore_str("tungstenite")
        .build();

    TermLogger::init(
        log_level,
        log_config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .unwrap();
}
