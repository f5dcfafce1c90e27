use crate::core::errors::{Error, Result};
use crate::core::filter::RangeFilter;
use crate::core::json::{self, JsonIpRanges};
use indexmap::IndexMap;
use log::info;

/*-------------------------------------------------------------------------------------------------
  Service Prefixes
-------------------------------------------------------------------------------------------------*/

/// Mapping from AWS service name to the ordered list of CIDR prefixes the service uses.
/// Insertion order follows feed order; services with no matching records are absent.
pub type ServicePrefixes = IndexMap<String, Vec<String>>;

/*-------------------------------------------------------------------------------------------------
  Ranges Client
-------------------------------------------------------------------------------------------------*/

/// Default URL for the AWS IP Ranges feed - see
/// [AWS IP address ranges](https://docs.aws.amazon.com/vpc/latest/userguide/aws-ip-ranges.html)
/// in the Amazon Virtual Private Cloud (VPC) User Guide for details.
pub const AWS_IP_RANGES_URL: &str = "https://ip-ranges.amazonaws.com/ip-ranges.json";

/// A client for retrieving the AWS IP Ranges feed and bucketing its prefix records by
/// service. One GET per call; a transport or parse failure is fatal to the run (no retry).
#[derive(Debug, Clone)]
pub struct RangesClient {
    url: String,
}

impl Default for RangesClient {
    fn default() -> Self {
        Self {
            url: AWS_IP_RANGES_URL.to_string(),
        }
    }
}

impl RangesClient {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self { url: url.into() }
    }

    /// Get the URL used to retrieve the AWS IP Ranges feed.
    pub fn url(&self) -> &str {
        &self.url
    }

    /*-------------------------------------------------------------------------
      Fetch Service Prefixes
    -------------------------------------------------------------------------*/

    /// Retrieve the feed and return the filtered service-to-prefixes mapping.
    pub fn fetch_service_prefixes(&self, filter: &RangeFilter) -> Result<ServicePrefixes> {
        let json = self.get_feed_json()?;
        let feed = json::parse(&json)?;
        Ok(bucket_by_service(&feed, filter))
    }

    fn get_feed_json(&self) -> Result<String> {
        info!("Get AWS IP Ranges: GET {}", self.url);
        reqwest::blocking::get(&self.url)
            .and_then(|response| response.error_for_status())
            .map_err(Error::from)?
            .text()
            .map_err(Error::from)
    }
}

/*-------------------------------------------------------------------------------------------------
  Bucket Feed Records By Service
-------------------------------------------------------------------------------------------------*/

/// Group the feed's prefix records into per-service buckets, applying the filter. IPv4
/// records are bucketed first; IPv6 records (when included) are appended after the IPv4
/// pass, so a service's IPv4 entries always precede its IPv6 entries.
pub fn bucket_by_service(feed: &JsonIpRanges, filter: &RangeFilter) -> ServicePrefixes {
    let mut service_prefixes = ServicePrefixes::new();

    for prefix in &feed.prefixes {
        if filter.include_record(&prefix.service, &prefix.region) {
            service_prefixes
                .entry(prefix.service.clone())
                .or_default()
                .push(prefix.ip_prefix.to_string());
        }
    }

    if filter.include_ipv6 {
        for prefix in &feed.ipv6_prefixes {
            if filter.include_record(&prefix.service, &prefix.region) {
                service_prefixes
                    .entry(prefix.service.clone())
                    .or_default()
                    .push(prefix.ipv6_prefix.to_string());
            }
        }
    }

    service_prefixes
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
