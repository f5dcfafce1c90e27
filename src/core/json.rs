use crate::core::errors::Result;
use chrono::{DateTime, Utc};
use ipnetwork::{Ipv4Network, Ipv6Network};
use serde::{Deserialize, Serialize};

/*-------------------------------------------------------------------------------------------------
  Parse JSON
-------------------------------------------------------------------------------------------------*/

pub fn parse(json: &str) -> Result<JsonIpRanges> {
    Ok(serde_json::from_str(json)?)
}

/*-------------------------------------------------------------------------------------------------
  JSON Data Structures
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  JSON IP Ranges
--------------------------------------------------------------------------------------*/

/// The AWS IP Ranges feed document. `syncToken` and `createDate` are parsed when present;
/// the sync path only consumes the IPv4 and IPv6 prefix lists.
#[derive(Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct JsonIpRanges {
    #[serde(rename = "syncToken", default, skip_serializing_if = "Option::is_none")]
    pub sync_token: Option<String>,

    #[serde(
        rename = "createDate",
        default,
        with = "crate::core::datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub create_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub prefixes: Vec<JsonIpPrefix>,

    #[serde(default)]
    pub ipv6_prefixes: Vec<JsonIpv6Prefix>,
}

/*--------------------------------------------------------------------------------------
  JSON IP (IPv4) Prefix
--------------------------------------------------------------------------------------*/

#[derive(Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct JsonIpPrefix {
    pub ip_prefix: Ipv4Network,
    pub region: String,
    pub service: String,
}

/*--------------------------------------------------------------------------------------
  JSON IPv6 Prefix
--------------------------------------------------------------------------------------*/

#[derive(Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct JsonIpv6Prefix {
    pub ipv6_prefix: Ipv6Network,
    pub region: String,
    pub service: String,
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
