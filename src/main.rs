use clap::Parser;
use log::error;
use std::process::ExitCode;
use unifi_aws_sync::{provision_groups, run_sync, Config, RangesClient, UnifiClient};

mod cli;

/*-------------------------------------------------------------------------------------------------
  Main
-------------------------------------------------------------------------------------------------*/

fn main() -> ExitCode {
    let args = cli::Args::parse();

    stderrlog::new()
        .module(module_path!())
        .module("unifi_aws_sync")
        .verbosity(args.verbose.log_level_filter())
        .init()
        .unwrap();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Run
-------------------------------------------------------------------------------------------------*/

fn run(args: &cli::Args) -> unifi_aws_sync::Result<()> {
    // Configuration is validated in full before any network call is made.
    let config = Config::from_env()?;

    let unifi = UnifiClient::new(
        config.api_url.as_str(),
        config.console_id.as_str(),
        config.site_name.as_str(),
        config.api_key.as_str(),
    );

    let command = args
        .command
        .clone()
        .unwrap_or(cli::Command::Sync { ipv6: false });

    match command {
        cli::Command::Sync { ipv6 } => {
            let ranges = RangesClient::new(config.ranges_url.as_str());
            let filter = config.range_filter(ipv6);

            let summary = run_sync(&config, &ranges, &unifi, &filter)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        cli::Command::Provision => {
            let mappings = provision_groups(&config, &unifi)?;
            let value = mappings
                .iter()
                .map(|(service, group_id)| format!("{service}:{group_id}"))
                .collect::<Vec<String>>()
                .join(",");

            println!("UNIFI_GROUP_MAPPINGS={value}");
        }
    }

    Ok(())
}
