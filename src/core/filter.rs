use std::collections::HashSet;

/*-------------------------------------------------------------------------------------------------
  Range Filter
-------------------------------------------------------------------------------------------------*/

/// Filter used to include AWS IP Prefix records based on the service and region associated
/// with each record, and to control whether IPv6 prefixes are included. With no service or
/// region sets, all records pass; IPv4-only is the default.
#[derive(Debug, Clone, Default)]
pub struct RangeFilter {
    /// Include records used by these AWS services.
    pub services: Option<HashSet<String>>,

    /// Include records from these AWS regions.
    pub regions: Option<HashSet<String>>,

    /// Include IPv6 prefixes in addition to IPv4.
    pub include_ipv6: bool,
}

/*--------------------------------------------------------------------------------------
  Range Filter Implementation
--------------------------------------------------------------------------------------*/

impl RangeFilter {
    pub fn new(
        services: Option<HashSet<String>>,
        regions: Option<HashSet<String>>,
        include_ipv6: bool,
    ) -> Self {
        Self {
            services,
            regions,
            include_ipv6,
        }
    }

    /*-------------------------------------------------------------------------
      Filter Functions
    -------------------------------------------------------------------------*/

    pub(crate) fn match_service(&self, service: &str) -> bool {
        match &self.services {
            Some(filter_services) => filter_services.contains(service),
            // No service filter includes all services
            None => true,
        }
    }

    pub(crate) fn match_region(&self, region: &str) -> bool {
        match &self.regions {
            Some(filter_regions) => filter_regions.contains(region),
            // No region filter includes all regions
            None => true,
        }
    }

    pub(crate) fn include_record(&self, service: &str, region: &str) -> bool {
        self.match_service(service) && self.match_region(region)
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
