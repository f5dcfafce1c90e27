use crate::core::errors::{ConfigError, Result};
use crate::core::ranges::ServicePrefixes;
use indexmap::IndexMap;
use log::warn;

/*-------------------------------------------------------------------------------------------------
  Group Mapping
-------------------------------------------------------------------------------------------------*/

/// Ordered mapping from AWS service name to the UniFi address-group id that receives the
/// service's prefixes. Declaration order is update order.
pub type GroupMapping = IndexMap<String, String>;

/// Directive label used in legacy single-group mode.
pub const LEGACY_MODE_LABEL: &str = "legacy_single_group";

/*-------------------------------------------------------------------------------------------------
  Update Directives
-------------------------------------------------------------------------------------------------*/

/// One full-replace update to perform: write `prefixes` as the entire membership of the
/// group identified by `group_id`. `label` is the service name in mapped mode or
/// [LEGACY_MODE_LABEL] in legacy mode.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UpdateDirective {
    pub label: String,
    pub group_id: String,
    pub prefixes: Vec<String>,
}

/*-------------------------------------------------------------------------------------------------
  Resolve Directives
-------------------------------------------------------------------------------------------------*/

/// Resolve the fetched service prefixes into an ordered list of update directives.
///
/// Mapped mode (non-empty `mappings`) produces one directive per mapping pair, in
/// declaration order; a pair whose service is absent from the fetched data is skipped with
/// a warning. Legacy mode (empty `mappings`, `legacy_group_id` set) produces a single
/// directive combining every fetched service's prefixes in fetched-map order. Mapped mode
/// takes precedence when both are configured.
pub fn resolve_directives(
    service_prefixes: &ServicePrefixes,
    mappings: &GroupMapping,
    legacy_group_id: Option<&str>,
) -> Result<Vec<UpdateDirective>> {
    if !mappings.is_empty() {
        let mut directives = Vec::new();

        for (service, group_id) in mappings {
            match service_prefixes.get(service) {
                Some(prefixes) => directives.push(UpdateDirective {
                    label: service.clone(),
                    group_id: group_id.clone(),
                    prefixes: prefixes.clone(),
                }),
                None => warn!("No IP ranges found for service {service}"),
            }
        }

        Ok(directives)
    } else if let Some(group_id) = legacy_group_id {
        let combined: Vec<String> = service_prefixes.values().flatten().cloned().collect();

        Ok(vec![UpdateDirective {
            label: LEGACY_MODE_LABEL.to_string(),
            group_id: group_id.to_string(),
            prefixes: combined,
        }])
    } else {
        Err(ConfigError::NoGroupTarget.into())
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
