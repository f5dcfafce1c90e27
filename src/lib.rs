//! Synchronize AWS service IP ranges into UniFi firewall address groups.
//!
//! Fetches the published [AWS IP Ranges](https://docs.aws.amazon.com/vpc/latest/userguide/aws-ip-ranges.html)
//! feed, filters it by service, region, and address family, and writes the resulting CIDR
//! lists into UniFi firewall address groups via the Site Manager proxy API. Every update is
//! a full replacement of the target group's membership; runs are stateless and idempotent
//! for an unchanged feed.
//!
//! ```no_run
//! # fn main() -> unifi_aws_sync::Result<()> {
//! let config = unifi_aws_sync::Config::from_env()?;
//! let ranges = unifi_aws_sync::RangesClient::new(config.ranges_url.as_str());
//! let unifi = unifi_aws_sync::UnifiClient::new(
//!     config.api_url.as_str(),
//!     config.console_id.as_str(),
//!     config.site_name.as_str(),
//!     config.api_key.as_str(),
//! );
//!
//! let filter = config.range_filter(false);
//! let summary = unifi_aws_sync::run_sync(&config, &ranges, &unifi, &filter)?;
//! println!("{}", serde_json::to_string_pretty(&summary)?);
//! # Ok(())
//! # }
//! ```

/*-------------------------------------------------------------------------------------------------
  Modules
-------------------------------------------------------------------------------------------------*/

pub mod core;

/*-------------------------------------------------------------------------------------------------
  Public Interface
-------------------------------------------------------------------------------------------------*/

pub use crate::core::config::{Config, DEFAULT_SERVICE_FILTER};
pub use crate::core::errors::{ApiError, ConfigError, Error, Result};
pub use crate::core::filter::RangeFilter;
pub use crate::core::json::{JsonIpPrefix, JsonIpRanges, JsonIpv6Prefix};
pub use crate::core::ranges::{bucket_by_service, RangesClient, ServicePrefixes, AWS_IP_RANGES_URL};
pub use crate::core::resolve::{
    resolve_directives, GroupMapping, UpdateDirective, LEGACY_MODE_LABEL,
};
pub use crate::core::sync::{provision_groups, run_sync, SyncSummary, UpdateResult};
pub use crate::core::unifi::{FirewallGroup, UnifiClient, UnifiEnvelope, UnifiMeta, UNIFI_API_URL};
