use clap::{Parser, Subcommand};

/*-------------------------------------------------------------------------------------------------
  Command Line Interface (CLI) Arguments
-------------------------------------------------------------------------------------------------*/

#[derive(Parser, Debug)]
#[command(author, version, about = "Sync AWS IP ranges into UniFi firewall address groups.", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Logging verbosity
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch the AWS IP ranges and replace the configured address groups (default)
    Sync {
        /// Include IPv6 prefixes in addition to IPv4
        #[arg(short = '6', long)]
        ipv6: bool,
    },

    /// Create AWS-<SERVICE> address groups and print the UNIFI_GROUP_MAPPINGS value
    Provision,
}
