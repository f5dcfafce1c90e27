use crate::core::config::Config;
use crate::core::errors::Result;
use crate::core::filter::RangeFilter;
use crate::core::ranges::RangesClient;
use crate::core::resolve::resolve_directives;
use crate::core::unifi::UnifiClient;
use log::info;
use serde::Serialize;
use std::collections::HashMap;

/*-------------------------------------------------------------------------------------------------
  Run Summary
-------------------------------------------------------------------------------------------------*/

/// Outcome of one group update: the service name (or the legacy-mode tag), the target
/// group id, the number of IPs applied, and the raw API response.
#[derive(Debug, Serialize)]
pub struct UpdateResult {
    pub service: String,
    pub group_id: String,
    pub ip_count: usize,
    pub result: serde_json::Value,
}

/// Summary of one synchronization run, serialized as the run's JSON output.
#[derive(Debug, Serialize)]
pub struct SyncSummary {
    pub message: String,
    pub total_ips: usize,
    pub groups_updated: usize,
    pub results: Vec<UpdateResult>,
}

/*-------------------------------------------------------------------------------------------------
  Synchronization
-------------------------------------------------------------------------------------------------*/

/// Run one synchronization: fetch the AWS IP ranges, resolve the update directives, and
/// apply each full-replace update in order. Aborts on the first update failure; earlier
/// groups stay updated (sequential, non-atomic).
pub fn run_sync(
    config: &Config,
    ranges: &RangesClient,
    unifi: &UnifiClient,
    filter: &RangeFilter,
) -> Result<SyncSummary> {
    info!(
        "Fetching AWS IP ranges for services: {:?}",
        config.service_filter
    );
    if let Some(regions) = &config.region_filter {
        info!("Filtering by regions: {regions:?}");
    }

    let service_prefixes = ranges.fetch_service_prefixes(filter)?;

    let total_ips: usize = service_prefixes.values().map(Vec::len).sum();
    info!(
        "Found {} total IP ranges across {} services",
        total_ips,
        service_prefixes.len()
    );

    let directives = resolve_directives(
        &service_prefixes,
        &config.group_mappings,
        config.group_id.as_deref(),
    )?;

    let mut results = Vec::new();
    for directive in directives {
        info!(
            "Updating {} group {} with {} IPs",
            directive.label,
            directive.group_id,
            directive.prefixes.len()
        );

        let result = unifi.replace_group_members(&directive.group_id, &directive.prefixes)?;

        results.push(UpdateResult {
            service: directive.label,
            group_id: directive.group_id,
            ip_count: directive.prefixes.len(),
            result,
        });
    }

    Ok(SyncSummary {
        message: "Successfully updated UniFi address groups".to_string(),
        total_ips,
        groups_updated: results.len(),
        results,
    })
}

/*-------------------------------------------------------------------------------------------------
  Group Provisioning
-------------------------------------------------------------------------------------------------*/

/// Ensure an `AWS-<SERVICE>` address group exists for each configured service, reusing
/// existing groups by name. Returns the `(service, group_id)` pairs in service order, for
/// use as the `UNIFI_GROUP_MAPPINGS` value. Out-of-band helper; not part of the sync path.
pub fn provision_groups(config: &Config, unifi: &UnifiClient) -> Result<Vec<(String, String)>> {
    let services = config.service_filter.clone().ok_or(
        "AWS_SERVICE_FILTER must name the services to provision address groups for",
    )?;

    let existing = unifi.list_firewall_groups()?;
    let existing_by_name: HashMap<&str, &str> = existing
        .iter()
        .filter(|group| group.group_type == "address-group")
        .map(|group| (group.name.as_str(), group.id.as_str()))
        .collect();
    info!("Found {} existing address groups", existing_by_name.len());

    let mut mappings = Vec::new();
    for service in &services {
        let group_name = format!("AWS-{service}");

        let group_id = match existing_by_name.get(group_name.as_str()) {
            Some(group_id) => {
                info!("{group_name} already exists (ID: {group_id})");
                (*group_id).to_string()
            }
            None => {
                info!("Creating {group_name}");
                unifi.create_address_group(&group_name)?.id
            }
        };

        mappings.push((service.clone(), group_id));
    }

    Ok(mappings)
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
