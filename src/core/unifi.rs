use crate::core::errors::{ApiError, Result};
use log::{info, warn};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::json;

/*-------------------------------------------------------------------------------------------------
  UniFi Site Manager API Client
-------------------------------------------------------------------------------------------------*/

/// Default base URL for the UniFi Site Manager API.
pub const UNIFI_API_URL: &str = "https://api.ui.com";

/// A client for the UniFi Network application's `firewallgroup` REST endpoints, reached
/// through the Site Manager console proxy. Requests are synchronous and authenticated with
/// an `X-API-Key` header; responses use the legacy `{meta: {rc}, data: [...]}` envelope.
#[derive(Debug, Clone)]
pub struct UnifiClient {
    base_url: String,
    console_id: String,
    site_name: String,
    api_key: String,
    http: reqwest::blocking::Client,
}

impl UnifiClient {
    pub fn new<S: Into<String>>(base_url: S, console_id: S, site_name: S, api_key: S) -> Self {
        Self {
            base_url: base_url.into(),
            console_id: console_id.into(),
            site_name: site_name.into(),
            api_key: api_key.into(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /*-------------------------------------------------------------------------
      URL Construction
    -------------------------------------------------------------------------*/

    fn firewall_group_url(&self) -> String {
        format!(
            "{}/v1/connector/consoles/{}/proxy/network/api/s/{}/rest/firewallgroup",
            self.base_url.trim_end_matches('/'),
            self.console_id,
            self.site_name
        )
    }

    /*-------------------------------------------------------------------------
      List Firewall Groups
    -------------------------------------------------------------------------*/

    /// List the site's firewall groups (all group types).
    pub fn list_firewall_groups(&self) -> Result<Vec<FirewallGroup>> {
        let body = self.send_checked(self.http.get(self.firewall_group_url()))?;
        let envelope: UnifiEnvelope<FirewallGroup> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }

    /*-------------------------------------------------------------------------
      Create Address Group
    -------------------------------------------------------------------------*/

    /// Create an empty address group with the given name and return the created object.
    pub fn create_address_group(&self, name: &str) -> Result<FirewallGroup> {
        let payload = json!({
            "name": name,
            "group_type": "address-group",
            "group_members": [],
        });

        let body = self.send_checked(self.http.post(self.firewall_group_url()).json(&payload))?;
        let envelope: UnifiEnvelope<FirewallGroup> = serde_json::from_str(&body)?;

        if envelope.meta.rc != "ok" {
            return Err(format!(
                "Failed to create address group {:?}: rc={}{}",
                name,
                envelope.meta.rc,
                envelope
                    .meta
                    .msg
                    .map(|msg| format!(" msg={msg}"))
                    .unwrap_or_default()
            )
            .into());
        }

        envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| format!("UniFi API returned no data creating group {name:?}").into())
    }

    /*-------------------------------------------------------------------------
      Replace Group Members
    -------------------------------------------------------------------------*/

    /// Replace the named group's entire member list with `members`, in order. This is a
    /// destructive overwrite: any prior membership not in `members` is removed.
    pub fn replace_group_members(
        &self,
        group_id: &str,
        members: &[String],
    ) -> Result<serde_json::Value> {
        if members.is_empty() {
            warn!("Replacing group {group_id} with an EMPTY member list");
        }

        let url = format!("{}/{}", self.firewall_group_url(), group_id);
        let payload = json!({ "group_members": members });

        let body = self.send_checked(self.http.put(url).json(&payload))?;
        info!("Replaced group {} membership with {} IPs", group_id, members.len());

        Ok(serde_json::from_str(&body)?)
    }

    /*-------------------------------------------------------------------------
      Private Methods
    -------------------------------------------------------------------------*/

    /// Send a request with the standard headers; return the response body on success or an
    /// [ApiError] carrying the status code and body on a non-success status.
    fn send_checked(&self, request: reqwest::blocking::RequestBuilder) -> Result<String> {
        let response = request
            .header("X-API-Key", &self.api_key)
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(ApiError {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(body)
    }
}

/*-------------------------------------------------------------------------------------------------
  UniFi API Data Structures
-------------------------------------------------------------------------------------------------*/

/// The legacy API's `{data: [], meta: {rc, msg}}` response envelope.
#[derive(Debug, Deserialize)]
pub struct UnifiEnvelope<T> {
    pub meta: UnifiMeta,

    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct UnifiMeta {
    pub rc: String,

    #[serde(default)]
    pub msg: Option<String>,
}

/// A firewall group object as returned by the UniFi Network application.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct FirewallGroup {
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    pub group_type: String,

    #[serde(default)]
    pub group_members: Vec<String>,
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
