//! Integration tests for the localization client.
//!
//! These tests run the full stack — resolver, refresh engine, and the
//! reqwest provider adapter — against a wiremock server speaking the
//! provider contract: a locale list endpoint and per-locale
//! `simple_json` download endpoints, both with conditional-request and
//! rate-limit headers.

use std::sync::Arc;
use std::time::Duration;

use localizations::{AcceptLanguage, Localization, LocaleName, LocalizationOptions, Lookup};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ==================== Test Helpers ====================

const TOKEN_HEADER: &str = "token test-token";

fn options(server: &MockServer) -> LocalizationOptions {
    LocalizationOptions::new("test-token", "test-project", Duration::from_secs(900))
        .unwrap()
        .with_base_url(&server.uri())
}

fn locales_body() -> serde_json::Value {
    json!([
        {"id": "loc-en", "name": "en", "code": "en", "default": true, "main": true, "rtl": false},
        {"id": "loc-fr", "name": "fr", "code": "fr", "default": false, "main": false, "rtl": false}
    ])
}

async fn mount_locales(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/projects/test-project/locales"))
        .and(header("Authorization", TOKEN_HEADER))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_download(server: &MockServer, locale_id: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/projects/test-project/locales/{locale_id}/download"
        )))
        .and(query_param("file_format", "simple_json"))
        .and(header("Authorization", TOKEN_HEADER))
        .respond_with(template)
        .mount(server)
        .await;
}

// ==================== Refresh-Then-Resolve Tests ====================

#[tokio::test]
async fn test_first_lookup_refreshes_and_resolves() {
    let server = MockServer::start().await;
    mount_locales(&server, ResponseTemplate::new(200).set_body_json(locales_body())).await;
    mount_download(
        &server,
        "loc-en",
        ResponseTemplate::new(200)
            .set_body_json(json!({"greeting": "hello", "help_url": "https://example.com/help"}))
            .insert_header("ETag", "\"en-v1\"")
            .insert_header("Last-Modified", "Tue, 15 Nov 1994 12:45:26 GMT"),
    )
    .await;
    mount_download(
        &server,
        "loc-fr",
        ResponseTemplate::new(200).set_body_json(json!({"greeting": "bonjour"})),
    )
    .await;

    let localization = Localization::new(options(&server));

    // The very first lookup triggers the refresh cycle lazily
    let result = localization.get("greeting", "en").await.unwrap();
    let record = result.found().unwrap();
    assert_eq!(record.value(), "hello");
    assert_eq!(record.locale().as_str(), "en");
    assert_eq!(record.last_modified().unwrap().timestamp(), 784_903_526);

    let result = localization.get("greeting", "fr").await.unwrap();
    assert_eq!(result.found().unwrap().value(), "bonjour");
}

#[tokio::test]
async fn test_fresh_cache_serves_lookups_without_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/test-project/locales"))
        .respond_with(ResponseTemplate::new(200).set_body_json(locales_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/locales/loc-en/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"greeting": "hello"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/locales/loc-fr/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"greeting": "bonjour"})))
        .expect(1)
        .mount(&server)
        .await;

    let localization = Localization::new(options(&server));
    localization.warm_up().await;

    // TTL has not passed: these stay in memory
    for _ in 0..5 {
        assert!(localization.get("greeting", "en").await.unwrap().is_found());
    }

    server.verify().await;
}

// ==================== Conditional Request Tests ====================

#[tokio::test]
async fn test_second_refresh_with_unchanged_remote_is_idempotent() {
    let server = MockServer::start().await;

    // Conditional requests answer 304; mount them before the catch-alls
    Mock::given(method("GET"))
        .and(path("/projects/test-project/locales"))
        .and(header("If-None-Match", "\"cat-v1\""))
        .respond_with(ResponseTemplate::new(304))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/locales/loc-en/download"))
        .and(header("If-None-Match", "\"en-v1\""))
        .respond_with(ResponseTemplate::new(304))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/locales/loc-fr/download"))
        .and(header("If-None-Match", "\"fr-v1\""))
        .respond_with(ResponseTemplate::new(304))
        .mount(&server)
        .await;

    mount_locales(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(locales_body())
            .insert_header("ETag", "\"cat-v1\""),
    )
    .await;
    mount_download(
        &server,
        "loc-en",
        ResponseTemplate::new(200)
            .set_body_json(json!({"greeting": "hello"}))
            .insert_header("ETag", "\"en-v1\""),
    )
    .await;
    mount_download(
        &server,
        "loc-fr",
        ResponseTemplate::new(200)
            .set_body_json(json!({"greeting": "bonjour"}))
            .insert_header("ETag", "\"fr-v1\""),
    )
    .await;

    let localization = Localization::new(options(&server));
    localization.warm_up().await;

    let en = LocaleName::new("en").unwrap();
    let fr = LocaleName::new("fr").unwrap();
    let en_before = localization.cache().translations_for(&en).unwrap();
    let fr_before = localization.cache().translations_for(&fr).unwrap();

    localization.warm_up().await;

    // 304 everywhere: the cached sub-maps keep their identity
    let en_after = localization.cache().translations_for(&en).unwrap();
    let fr_after = localization.cache().translations_for(&fr).unwrap();
    assert!(Arc::ptr_eq(&en_before, &en_after));
    assert!(Arc::ptr_eq(&fr_before, &fr_after));
}

// ==================== Failure Handling Tests ====================

#[tokio::test]
async fn test_unauthorized_aborts_cycle_without_downloads() {
    let server = MockServer::start().await;
    mount_locales(&server, ResponseTemplate::new(401)).await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/locales/loc-en/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let localization = Localization::new(options(&server));
    localization.warm_up().await;

    // No crash, no downloads, lookups degrade to NotFound
    let result = localization.get("greeting", "en").await.unwrap();
    assert_eq!(result, Lookup::NotFound);

    server.verify().await;
}

#[tokio::test]
async fn test_partial_failure_serves_surviving_locale() {
    let server = MockServer::start().await;
    mount_locales(&server, ResponseTemplate::new(200).set_body_json(locales_body())).await;
    mount_download(
        &server,
        "loc-en",
        ResponseTemplate::new(200).set_body_json(json!({"greeting": "hello"})),
    )
    .await;
    mount_download(&server, "loc-fr", ResponseTemplate::new(500)).await;

    let options = options(&server).with_default_locale("en").unwrap();
    let localization = Localization::new(options);
    localization.warm_up().await;

    // The failed locale falls through the chain to the default
    let result = localization.get("greeting", "fr").await.unwrap();
    let record = result.found().unwrap();
    assert_eq!(record.locale().as_str(), "en");
    assert_eq!(record.value(), "hello");

    // The surviving locale answers directly
    let result = localization.get("greeting", "en").await.unwrap();
    assert_eq!(result.found().unwrap().locale().as_str(), "en");
}

#[tokio::test]
async fn test_malformed_document_leaves_locale_unpopulated() {
    let server = MockServer::start().await;
    mount_locales(&server, ResponseTemplate::new(200).set_body_json(locales_body())).await;
    mount_download(
        &server,
        "loc-en",
        ResponseTemplate::new(200).set_body_string("this is not json"),
    )
    .await;
    mount_download(
        &server,
        "loc-fr",
        ResponseTemplate::new(200).set_body_json(json!({"greeting": "bonjour"})),
    )
    .await;

    let localization = Localization::new(options(&server));
    localization.warm_up().await;

    assert_eq!(
        localization.get("greeting", "en").await.unwrap(),
        Lookup::NotFound
    );
    assert!(localization.get("greeting", "fr").await.unwrap().is_found());
}

// ==================== Rate Limit Tests ====================

#[tokio::test]
async fn test_rate_limit_reset_schedules_next_refresh() {
    let reset_epoch: i64 = 4_000_000_000;
    let server = MockServer::start().await;
    mount_locales(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(locales_body())
            .insert_header("X-Rate-Limit-Remaining", "0")
            .insert_header("X-Rate-Limit-Reset", reset_epoch.to_string().as_str()),
    )
    .await;
    mount_download(
        &server,
        "loc-en",
        ResponseTemplate::new(200).set_body_json(json!({"greeting": "hello"})),
    )
    .await;
    mount_download(
        &server,
        "loc-fr",
        ResponseTemplate::new(200).set_body_json(json!({})),
    )
    .await;

    let localization = Localization::new(options(&server));
    localization.warm_up().await;

    // The reset epoch overrides the TTL-based schedule
    assert_eq!(
        localization.cache().next_refresh_at().timestamp(),
        reset_epoch
    );
}

// ==================== Header-Driven Resolution Tests ====================

#[tokio::test]
async fn test_accept_language_resolution_end_to_end() {
    let server = MockServer::start().await;
    mount_locales(&server, ResponseTemplate::new(200).set_body_json(locales_body())).await;
    mount_download(
        &server,
        "loc-en",
        ResponseTemplate::new(200).set_body_json(json!({"greeting": "hello"})),
    )
    .await;
    mount_download(
        &server,
        "loc-fr",
        ResponseTemplate::new(200).set_body_json(json!({"greeting": "bonjour"})),
    )
    .await;

    let localization = Localization::new(options(&server));

    let preferences = AcceptLanguage::parse("en-GB;q=0.8,fr;q=0.9").unwrap();
    let result = localization
        .get_with_header("greeting", &preferences)
        .await
        .unwrap();
    assert_eq!(result.found().unwrap().value(), "bonjour");

    let values = localization
        .get_all_values_with_header(&preferences)
        .await
        .unwrap();
    assert_eq!(values.get("greeting").map(String::as_str), Some("bonjour"));
}
