use serde_json::json;
use std::collections::HashMap;
use tokio::task::spawn_blocking;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unifi_aws_sync::{
    provision_groups, run_sync, ApiError, Config, RangeFilter, RangesClient, UnifiClient,
};

/*-------------------------------------------------------------------------------------------------
  Helpers
-------------------------------------------------------------------------------------------------*/

const FEED_JSON: &str = r#"{
  "syncToken": "1640995200",
  "createDate": "2022-01-01-00-00-00",
  "prefixes": [
    {"ip_prefix": "3.0.0.0/15", "service": "EC2", "region": "us-east-1"},
    {"ip_prefix": "3.5.0.0/19", "service": "S3", "region": "us-east-1"}
  ],
  "ipv6_prefixes": []
}"#;

const GROUP_PATH: &str =
    "/v1/connector/consoles/console-1/proxy/network/api/s/default/rest/firewallgroup";

fn ok_envelope() -> serde_json::Value {
    json!({"meta": {"rc": "ok"}, "data": []})
}

fn unifi_client(base_url: &str) -> UnifiClient {
    UnifiClient::new(base_url, "console-1", "default", "test-key")
}

fn test_config(vars: HashMap<&'static str, String>) -> Config {
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

fn required_vars(feed_url: &str, api_url: &str) -> HashMap<&'static str, String> {
    HashMap::from([
        ("UNIFI_CONSOLE_ID", "console-1".to_string()),
        ("UNIFI_SITE_NAME", "default".to_string()),
        ("UNIFI_API_KEY", "test-key".to_string()),
        ("AWS_IP_RANGES_URL", feed_url.to_string()),
        ("UNIFI_API_URL", api_url.to_string()),
    ])
}

async fn mount_feed(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/ip-ranges.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FEED_JSON, "application/json"))
        .mount(server)
        .await;
}

/*-------------------------------------------------------------------------------------------------
  Range Fetcher
-------------------------------------------------------------------------------------------------*/

#[tokio::test]
async fn fetch_filters_by_service() {
    let server = MockServer::start().await;
    mount_feed(&server).await;

    let url = format!("{}/ip-ranges.json", server.uri());
    let service_prefixes = spawn_blocking(move || {
        let client = RangesClient::new(url);
        let filter = RangeFilter::new(Some(["EC2".to_string()].into()), None, false);
        client.fetch_service_prefixes(&filter)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(service_prefixes.len(), 1);
    assert_eq!(service_prefixes["EC2"], vec!["3.0.0.0/15"]);
}

#[tokio::test]
async fn fetch_transport_error_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip-ranges.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let url = format!("{}/ip-ranges.json", server.uri());
    let result = spawn_blocking(move || {
        RangesClient::new(url).fetch_service_prefixes(&RangeFilter::default())
    })
    .await
    .unwrap();

    assert!(result.is_err());
}

#[tokio::test]
async fn fetch_malformed_feed_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip-ranges.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let url = format!("{}/ip-ranges.json", server.uri());
    let result = spawn_blocking(move || {
        RangesClient::new(url).fetch_service_prefixes(&RangeFilter::default())
    })
    .await
    .unwrap();

    assert!(result.is_err());
}

/*-------------------------------------------------------------------------------------------------
  Group Updater
-------------------------------------------------------------------------------------------------*/

#[tokio::test]
async fn replace_group_members_puts_full_membership() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("{GROUP_PATH}/grp-1")))
        .and(header("X-API-Key", "test-key"))
        .and(body_json(json!({"group_members": ["3.0.0.0/15", "3.5.0.0/19"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope()))
        .expect(1)
        .mount(&server)
        .await;

    let base_url = server.uri();
    let result = spawn_blocking(move || {
        let members = vec!["3.0.0.0/15".to_string(), "3.5.0.0/19".to_string()];
        unifi_client(&base_url).replace_group_members("grp-1", &members)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(result["meta"]["rc"], "ok");
}

#[tokio::test]
async fn replace_group_members_is_idempotent() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("{GROUP_PATH}/grp-1")))
        .and(body_json(json!({"group_members": ["3.0.0.0/15"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope()))
        .expect(2)
        .mount(&server)
        .await;

    let base_url = server.uri();
    let (first, second) = spawn_blocking(move || {
        let client = unifi_client(&base_url);
        let members = vec!["3.0.0.0/15".to_string()];
        (
            client.replace_group_members("grp-1", &members),
            client.replace_group_members("grp-1", &members),
        )
    })
    .await
    .unwrap();

    // Same input, same outcome; both calls carried the identical full membership.
    assert_eq!(first.unwrap(), second.unwrap());
}

#[tokio::test]
async fn replace_group_members_surfaces_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("{GROUP_PATH}/grp-1")))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let base_url = server.uri();
    let error = spawn_blocking(move || {
        unifi_client(&base_url).replace_group_members("grp-1", &["3.0.0.0/15".to_string()])
    })
    .await
    .unwrap()
    .unwrap_err();

    let api_error = error.downcast_ref::<ApiError>().unwrap();
    assert_eq!(api_error.status, 401);
    assert_eq!(api_error.body, "invalid api key");
}

/*-------------------------------------------------------------------------------------------------
  Full Sync Run
-------------------------------------------------------------------------------------------------*/

#[tokio::test]
async fn sync_mapped_mode_updates_each_group() {
    let feed_server = MockServer::start().await;
    let unifi_server = MockServer::start().await;
    mount_feed(&feed_server).await;

    Mock::given(method("PUT"))
        .and(path(format!("{GROUP_PATH}/grp-1")))
        .and(body_json(json!({"group_members": ["3.0.0.0/15"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope()))
        .expect(1)
        .mount(&unifi_server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{GROUP_PATH}/grp-2")))
        .and(body_json(json!({"group_members": ["3.5.0.0/19"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope()))
        .expect(1)
        .mount(&unifi_server)
        .await;

    let mut vars = required_vars(
        &format!("{}/ip-ranges.json", feed_server.uri()),
        &unifi_server.uri(),
    );
    vars.insert("AWS_SERVICE_FILTER", "EC2,S3".to_string());
    vars.insert("UNIFI_GROUP_MAPPINGS", "EC2:grp-1,S3:grp-2".to_string());

    let summary = spawn_blocking(move || {
        let config = test_config(vars);
        let ranges = RangesClient::new(config.ranges_url.as_str());
        let unifi = UnifiClient::new(
            config.api_url.as_str(),
            config.console_id.as_str(),
            config.site_name.as_str(),
            config.api_key.as_str(),
        );
        let filter = config.range_filter(false);
        run_sync(&config, &ranges, &unifi, &filter)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(summary.total_ips, 2);
    assert_eq!(summary.groups_updated, 2);
    assert_eq!(summary.results[0].service, "EC2");
    assert_eq!(summary.results[0].ip_count, 1);
    assert_eq!(summary.results[1].service, "S3");
}

#[tokio::test]
async fn sync_legacy_mode_combines_services_into_one_group() {
    let feed_server = MockServer::start().await;
    let unifi_server = MockServer::start().await;
    mount_feed(&feed_server).await;

    // All matched services' prefixes land in one group, feed order preserved.
    Mock::given(method("PUT"))
        .and(path(format!("{GROUP_PATH}/grp-9")))
        .and(body_json(json!({"group_members": ["3.0.0.0/15", "3.5.0.0/19"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope()))
        .expect(1)
        .mount(&unifi_server)
        .await;

    let mut vars = required_vars(
        &format!("{}/ip-ranges.json", feed_server.uri()),
        &unifi_server.uri(),
    );
    vars.insert("AWS_SERVICE_FILTER", "EC2,S3".to_string());
    vars.insert("UNIFI_GROUP_ID", "grp-9".to_string());

    let summary = spawn_blocking(move || {
        let config = test_config(vars);
        let ranges = RangesClient::new(config.ranges_url.as_str());
        let unifi = UnifiClient::new(
            config.api_url.as_str(),
            config.console_id.as_str(),
            config.site_name.as_str(),
            config.api_key.as_str(),
        );
        let filter = config.range_filter(false);
        run_sync(&config, &ranges, &unifi, &filter)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(summary.groups_updated, 1);
    assert_eq!(summary.results[0].service, "legacy_single_group");
    assert_eq!(summary.results[0].ip_count, 2);
}

#[tokio::test]
async fn sync_aborts_on_first_update_error() {
    let feed_server = MockServer::start().await;
    let unifi_server = MockServer::start().await;
    mount_feed(&feed_server).await;

    Mock::given(method("PUT"))
        .and(path(format!("{GROUP_PATH}/grp-1")))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad group"))
        .expect(1)
        .mount(&unifi_server)
        .await;
    // grp-2 must never be touched after grp-1 fails.
    Mock::given(method("PUT"))
        .and(path(format!("{GROUP_PATH}/grp-2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope()))
        .expect(0)
        .mount(&unifi_server)
        .await;

    let mut vars = required_vars(
        &format!("{}/ip-ranges.json", feed_server.uri()),
        &unifi_server.uri(),
    );
    vars.insert("AWS_SERVICE_FILTER", "EC2,S3".to_string());
    vars.insert("UNIFI_GROUP_MAPPINGS", "EC2:grp-1,S3:grp-2".to_string());

    let error = spawn_blocking(move || {
        let config = test_config(vars);
        let ranges = RangesClient::new(config.ranges_url.as_str());
        let unifi = UnifiClient::new(
            config.api_url.as_str(),
            config.console_id.as_str(),
            config.site_name.as_str(),
            config.api_key.as_str(),
        );
        let filter = config.range_filter(false);
        run_sync(&config, &ranges, &unifi, &filter)
    })
    .await
    .unwrap()
    .unwrap_err();

    let api_error = error.downcast_ref::<ApiError>().unwrap();
    assert_eq!(api_error.status, 400);
}

#[tokio::test]
async fn sync_mapped_service_absent_from_feed_is_skipped() {
    let feed_server = MockServer::start().await;
    let unifi_server = MockServer::start().await;
    mount_feed(&feed_server).await;

    Mock::given(method("PUT"))
        .and(path(format!("{GROUP_PATH}/grp-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope()))
        .expect(1)
        .mount(&unifi_server)
        .await;

    let mut vars = required_vars(
        &format!("{}/ip-ranges.json", feed_server.uri()),
        &unifi_server.uri(),
    );
    // CLOUDFRONT passes the service filter but has no records in the feed.
    vars.insert("AWS_SERVICE_FILTER", "EC2,CLOUDFRONT".to_string());
    vars.insert(
        "UNIFI_GROUP_MAPPINGS",
        "EC2:grp-1,CLOUDFRONT:grp-3".to_string(),
    );

    let summary = spawn_blocking(move || {
        let config = test_config(vars);
        let ranges = RangesClient::new(config.ranges_url.as_str());
        let unifi = UnifiClient::new(
            config.api_url.as_str(),
            config.console_id.as_str(),
            config.site_name.as_str(),
            config.api_key.as_str(),
        );
        let filter = config.range_filter(false);
        run_sync(&config, &ranges, &unifi, &filter)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(summary.groups_updated, 1); // CLOUDFRONT pair skipped, run succeeded
    assert_eq!(summary.results[0].service, "EC2");
}

/*-------------------------------------------------------------------------------------------------
  Group Provisioning
-------------------------------------------------------------------------------------------------*/

#[tokio::test]
async fn provision_reuses_existing_groups_and_creates_missing() {
    let unifi_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GROUP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"rc": "ok"},
            "data": [
                {"_id": "grp-1", "name": "AWS-EC2", "group_type": "address-group",
                 "group_members": []},
                {"_id": "grp-x", "name": "AWS-S3", "group_type": "port-group",
                 "group_members": []}
            ]
        })))
        .expect(1)
        .mount(&unifi_server)
        .await;

    // AWS-S3 exists only as a port-group, so an address group is created for it.
    Mock::given(method("POST"))
        .and(path(GROUP_PATH))
        .and(body_json(json!({
            "name": "AWS-S3",
            "group_type": "address-group",
            "group_members": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"rc": "ok"},
            "data": [{"_id": "grp-2", "name": "AWS-S3", "group_type": "address-group",
                      "group_members": []}]
        })))
        .expect(1)
        .mount(&unifi_server)
        .await;

    let mut vars = required_vars("http://unused.invalid/ip-ranges.json", &unifi_server.uri());
    vars.insert("AWS_SERVICE_FILTER", "EC2,S3".to_string());
    vars.insert("UNIFI_GROUP_ID", "grp-9".to_string());

    let mappings = spawn_blocking(move || {
        let config = test_config(vars);
        let unifi = UnifiClient::new(
            config.api_url.as_str(),
            config.console_id.as_str(),
            config.site_name.as_str(),
            config.api_key.as_str(),
        );
        provision_groups(&config, &unifi)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(
        mappings,
        vec![
            ("EC2".to_string(), "grp-1".to_string()),
            ("S3".to_string(), "grp-2".to_string())
        ]
    );
}
