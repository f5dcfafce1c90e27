use crate::core::errors::{ConfigError, Result};
use crate::core::filter::RangeFilter;
use crate::core::ranges::AWS_IP_RANGES_URL;
use crate::core::resolve::GroupMapping;
use crate::core::unifi::UNIFI_API_URL;
use std::env;

/*-------------------------------------------------------------------------------------------------
  Configuration
-------------------------------------------------------------------------------------------------*/

/// Default AWS service allow-list when `AWS_SERVICE_FILTER` is unset.
pub const DEFAULT_SERVICE_FILTER: &str = "AMAZON";

/// Run configuration, constructed once at the entry point and passed into each component.
/// No component reads the process environment directly.
#[derive(Debug, Clone)]
pub struct Config {
    /// UniFi console id (`UNIFI_CONSOLE_ID`).
    pub console_id: String,

    /// UniFi site internal reference name (`UNIFI_SITE_NAME`).
    pub site_name: String,

    /// UniFi API key (`UNIFI_API_KEY`).
    pub api_key: String,

    /// AWS service allow-list (`AWS_SERVICE_FILTER`); `None` means no service restriction.
    pub service_filter: Option<Vec<String>>,

    /// AWS region allow-list (`AWS_REGION_FILTER`); `None` means no region restriction.
    pub region_filter: Option<Vec<String>>,

    /// Service-to-group-id mapping (`UNIFI_GROUP_MAPPINGS`); non-empty enables mapped mode.
    pub group_mappings: GroupMapping,

    /// Legacy single group id (`UNIFI_GROUP_ID`); used only when `group_mappings` is empty.
    pub group_id: Option<String>,

    /// AWS IP Ranges feed URL (`AWS_IP_RANGES_URL`).
    pub ranges_url: String,

    /// UniFi Site Manager API base URL (`UNIFI_API_URL`).
    pub api_url: String,
}

/*--------------------------------------------------------------------------------------
  Config Implementation
--------------------------------------------------------------------------------------*/

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from a key lookup function. Empty values are treated the
    /// same as unset values. All missing required keys are reported in a single error, and
    /// a missing group target is rejected here, before any network call.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let console_id = get("UNIFI_CONSOLE_ID");
        let site_name = get("UNIFI_SITE_NAME");
        let api_key = get("UNIFI_API_KEY");

        let missing: Vec<String> = [
            ("UNIFI_CONSOLE_ID", &console_id),
            ("UNIFI_SITE_NAME", &site_name),
            ("UNIFI_API_KEY", &api_key),
        ]
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| key.to_string())
        .collect();

        if !missing.is_empty() {
            return Err(ConfigError::MissingVars(missing).into());
        }

        // An explicitly empty AWS_SERVICE_FILTER disables the service restriction; only an
        // unset variable falls back to the default allow-list.
        let service_filter = match lookup("AWS_SERVICE_FILTER") {
            Some(value) => parse_list(&value),
            None => parse_list(DEFAULT_SERVICE_FILTER),
        };
        let region_filter = get("AWS_REGION_FILTER").as_deref().and_then(parse_list);

        let group_mappings = get("UNIFI_GROUP_MAPPINGS")
            .as_deref()
            .map(parse_group_mappings)
            .unwrap_or_default();
        let group_id = get("UNIFI_GROUP_ID");

        if group_mappings.is_empty() && group_id.is_none() {
            return Err(ConfigError::NoGroupTarget.into());
        }

        Ok(Self {
            console_id: console_id.unwrap_or_default(),
            site_name: site_name.unwrap_or_default(),
            api_key: api_key.unwrap_or_default(),
            service_filter,
            region_filter,
            group_mappings,
            group_id,
            ranges_url: get("AWS_IP_RANGES_URL").unwrap_or_else(|| AWS_IP_RANGES_URL.to_string()),
            api_url: get("UNIFI_API_URL").unwrap_or_else(|| UNIFI_API_URL.to_string()),
        })
    }

    /// Build the feed filter from the configured service and region allow-lists.
    pub fn range_filter(&self, include_ipv6: bool) -> RangeFilter {
        RangeFilter::new(
            self.service_filter
                .as_ref()
                .map(|services| services.iter().cloned().collect()),
            self.region_filter
                .as_ref()
                .map(|regions| regions.iter().cloned().collect()),
            include_ipv6,
        )
    }
}

/*-------------------------------------------------------------------------------------------------
  Parsing Helpers
-------------------------------------------------------------------------------------------------*/

/// Parse a comma-separated list, trimming whitespace and dropping empty items. Returns
/// `None` when no items remain (an empty list means "no restriction").
fn parse_list(value: &str) -> Option<Vec<String>> {
    let items: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Parse a `SERVICE:GROUP_ID,SERVICE:GROUP_ID` mapping string, preserving declaration
/// order. Entries without a `:` separator are ignored.
fn parse_group_mappings(value: &str) -> GroupMapping {
    value
        .split(',')
        .filter_map(|entry| entry.split_once(':'))
        .map(|(service, group_id)| (service.trim().to_string(), group_id.trim().to_string()))
        .collect()
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
