//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the calendar site and the
//! registration server and exercise the crawl end-to-end.

use chrono::NaiveDate;
use everystocks_crawler::config::{Config, EventScope, FetcherConfig, UserAgentConfig};
use everystocks_crawler::crawler::{Coordinator, Fetcher, RetryPolicy};
use everystocks_crawler::registration::{submit_all, HttpRegistrar};
use everystocks_crawler::{CrawlerError, FetchError, ParseError};
use std::time::{Duration, Instant};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a calendar page with a container for every day of the month
///
/// `events` lists `(day, document_srl, name)` entries placed in that day's container.
fn calendar_page(year: i32, month: u32, days: u32, events: &[(u32, u32, &str)]) -> String {
    let mut html = String::from(r#"<html><body><div class="calendar">"#);
    for day in 1..=days {
        html.push_str(&format!(
            r#"<div class="cell"><div id="day_schedule_container_{}-{}-{}">"#,
            year, month, day
        ));
        for (_, srl, name) in events.iter().filter(|(d, _, _)| *d == day) {
            html.push_str(&format!(
                r#"<div class="drag"><a href="?document_srl={}">{}</a></div>"#,
                srl, name
            ));
        }
        html.push_str("</div></div>");
    }
    html.push_str("</div></body></html>");
    html
}

/// Builds a detail page whose content region holds `content`
fn detail_page(content: &str) -> String {
    format!(
        r#"<html><body>
        <div id="content"><div>
            <div>top</div><div>menu</div>
            <div><div>
                <div>title</div>
                <div><div>{}</div></div>
            </div></div>
        </div></div>
        <div class="document_popup_menu">Share this post</div>
        </body></html>"#,
        content
    )
}

fn test_config(base_url: &str, year: i32, month: u32) -> Config {
    let mut config = Config::default();
    config.source.base_url = format!("{}/", base_url);
    config.source.start_date = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    config.source.end_date = config.source.start_date;
    config.fetcher.max_attempts = 3;
    config.fetcher.retry_delay_ms = 10;
    config.fetcher.timeout_secs = 5;
    config.crawler.max_concurrent_events = 4;
    config.registration.endpoint = format!("{}/register", base_url);
    config.registration.submit_delay_ms = 0;
    config
}

async fn mount_calendar(server: &MockServer, year: i32, month: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("mid", "calendar"))
        .and(query_param("pYear", year.to_string()))
        .and(query_param("pMonth", month.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, srl: u32, content: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("document_srl", srl.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(detail_page(content))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_slow_detail(server: &MockServer, srl: u32, content: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("document_srl", srl.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(detail_page(content))
                .insert_header("content-type", "text/html")
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

async fn mount_february(server: &MockServer) {
    let page = calendar_page(
        2018,
        2,
        28,
        &[(1, 10, "GDP release"), (1, 11, "Fed minutes"), (15, 12, "CPI")],
    );
    mount_calendar(server, 2018, 2, page).await;
    mount_detail(server, 10, "Gross domestic product").await;
    mount_detail(server, 11, "Minutes of the meeting").await;
    mount_detail(server, 12, "Consumer price index").await;
}

fn test_fetcher(delay: Duration) -> Fetcher {
    let fetcher_config = FetcherConfig {
        timeout_secs: 5,
        ..FetcherConfig::default()
    };
    let client =
        everystocks_crawler::crawler::build_http_client(&fetcher_config, &UserAgentConfig::default())
            .expect("Failed to build client");
    Fetcher::with_client(client, RetryPolicy::new(3, delay))
}

#[tokio::test]
async fn test_month_crawl_day_scope() {
    let mock_server = MockServer::start().await;
    mount_february(&mock_server).await;

    let coordinator = Coordinator::new(test_config(&mock_server.uri(), 2018, 2))
        .expect("Failed to create coordinator");
    let mut events = coordinator.parse_month(2018, 2).await.expect("Crawl failed");
    events.sort_by(|a, b| a.event_name().cmp(b.event_name()));

    assert_eq!(events.len(), 3);

    let cpi = &events[0];
    assert_eq!(cpi.event_name(), "CPI");
    assert_eq!(cpi.event_content(), "Consumer price index");
    assert_eq!(cpi.event_time(), NaiveDate::from_ymd_opt(2018, 2, 15).unwrap());
    assert_eq!(
        cpi.links(),
        [format!("{}/?document_srl=12", mock_server.uri())]
    );

    let first_day = NaiveDate::from_ymd_opt(2018, 2, 1).unwrap();
    assert_eq!(events[1].event_name(), "Fed minutes");
    assert_eq!(events[1].event_time(), first_day);
    assert_eq!(events[2].event_name(), "GDP release");
    assert_eq!(events[2].event_time(), first_day);

    for event in &events {
        assert_eq!(event.links().len(), 1);
        assert!(!event.event_content().contains("Share this post"));
        assert_eq!(event.extra_fields()["source"], "everystocks.com");
    }
}

#[tokio::test]
async fn test_month_crawl_document_scope_repeats_events() {
    let mock_server = MockServer::start().await;
    mount_february(&mock_server).await;

    let mut config = test_config(&mock_server.uri(), 2018, 2);
    config.source.event_scope = EventScope::Document;

    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let events = coordinator.parse_month(2018, 2).await.expect("Crawl failed");

    // days-in-month x events-on-page
    assert_eq!(events.len(), 28 * 3);

    for day in 1..=28 {
        let date = NaiveDate::from_ymd_opt(2018, 2, day).unwrap();
        let count = events.iter().filter(|e| e.event_time() == date).count();
        assert_eq!(count, 3, "day {} should repeat every event", day);
    }
}

#[tokio::test]
async fn test_crawl_all_covers_window() {
    let mock_server = MockServer::start().await;
    mount_february(&mock_server).await;

    let march = calendar_page(2018, 3, 31, &[(9, 20, "Jobs report")]);
    mount_calendar(&mock_server, 2018, 3, march).await;
    mount_detail(&mock_server, 20, "Nonfarm payrolls").await;

    let mut config = test_config(&mock_server.uri(), 2018, 2);
    config.source.end_date = NaiveDate::from_ymd_opt(2018, 3, 1).unwrap();

    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let events = coordinator.crawl_all().await.expect("Crawl failed");

    assert_eq!(events.len(), 4);
    assert!(events.iter().any(|e| e.event_name() == "Jobs report"
        && e.event_time() == NaiveDate::from_ymd_opt(2018, 3, 9).unwrap()));
}

#[tokio::test]
async fn test_month_without_events() {
    let mock_server = MockServer::start().await;
    mount_calendar(&mock_server, 2018, 4, calendar_page(2018, 4, 30, &[])).await;

    let coordinator = Coordinator::new(test_config(&mock_server.uri(), 2018, 4))
        .expect("Failed to create coordinator");
    let events = coordinator.parse_month(2018, 4).await.expect("Crawl failed");

    assert!(events.is_empty());
}

#[tokio::test]
async fn test_missing_day_container_aborts_month() {
    let mock_server = MockServer::start().await;
    // Only 27 containers for a 28-day month
    mount_calendar(&mock_server, 2018, 2, calendar_page(2018, 2, 27, &[])).await;

    let coordinator = Coordinator::new(test_config(&mock_server.uri(), 2018, 2))
        .expect("Failed to create coordinator");
    let result = coordinator.parse_month(2018, 2).await;

    match result {
        Err(CrawlerError::Parse(ParseError::MissingElement { selector, .. })) => {
            assert!(selector.contains("day_schedule_container_2018-2-28"));
        }
        other => panic!("expected missing container error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failing_detail_page_aborts_month() {
    let mock_server = MockServer::start().await;
    let page = calendar_page(2018, 2, 28, &[(3, 30, "Broken")]);
    mount_calendar(&mock_server, 2018, 2, page).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("document_srl", "30"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let coordinator = Coordinator::new(test_config(&mock_server.uri(), 2018, 2))
        .expect("Failed to create coordinator");
    let result = coordinator.parse_month(2018, 2).await;

    assert!(matches!(
        result,
        Err(CrawlerError::Fetch(FetchError::Status { status: 404, .. }))
    ));
}

#[tokio::test]
async fn test_failing_event_cancels_rest_of_day() {
    let mock_server = MockServer::start().await;
    let page = calendar_page(2018, 2, 28, &[(3, 30, "Broken"), (3, 31, "Slow")]);
    mount_calendar(&mock_server, 2018, 2, page).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("document_srl", "30"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    mount_slow_detail(&mock_server, 31, "Never read", Duration::from_secs(3)).await;

    let coordinator = Coordinator::new(test_config(&mock_server.uri(), 2018, 2))
        .expect("Failed to create coordinator");

    let start = Instant::now();
    let result = coordinator.parse_month(2018, 2).await;
    let elapsed = start.elapsed();

    assert!(matches!(
        result,
        Err(CrawlerError::Fetch(FetchError::Status { status: 404, .. }))
    ));
    assert!(
        elapsed < Duration::from_millis(1500),
        "failure should not wait for the slow sibling, took {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_event_concurrency_is_capped() {
    let mock_server = MockServer::start().await;
    let names: Vec<String> = (0..8).map(|i| format!("Event {}", i)).collect();
    let entries: Vec<(u32, u32, &str)> = names
        .iter()
        .enumerate()
        .map(|(i, name)| (5, 40 + i as u32, name.as_str()))
        .collect();
    mount_calendar(&mock_server, 2018, 2, calendar_page(2018, 2, 28, &entries)).await;
    for (_, srl, name) in &entries {
        mount_slow_detail(&mock_server, *srl, name, Duration::from_millis(200)).await;
    }

    let mut config = test_config(&mock_server.uri(), 2018, 2);
    config.crawler.max_concurrent_events = 2;

    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");

    let start = Instant::now();
    let events = coordinator.parse_month(2018, 2).await.expect("Crawl failed");
    let elapsed = start.elapsed();

    assert_eq!(events.len(), 8);
    // 8 events, 2 at a time, 200ms each
    assert!(
        elapsed >= Duration::from_millis(750),
        "expected at least 4 rounds of requests, took {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_day_events_keep_page_order() {
    let mock_server = MockServer::start().await;
    let page = calendar_page(
        2018,
        2,
        28,
        &[(7, 50, "first"), (7, 51, "second"), (7, 52, "third")],
    );
    mount_calendar(&mock_server, 2018, 2, page).await;
    mount_slow_detail(&mock_server, 50, "one", Duration::from_millis(300)).await;
    mount_slow_detail(&mock_server, 51, "two", Duration::from_millis(150)).await;
    mount_detail(&mock_server, 52, "three").await;

    let coordinator = Coordinator::new(test_config(&mock_server.uri(), 2018, 2))
        .expect("Failed to create coordinator");
    let events = coordinator.parse_month(2018, 2).await.expect("Crawl failed");

    let names: Vec<_> = events.iter().map(|e| e.event_name()).collect();
    assert_eq!(names, ["first", "second", "third"]);
    let contents: Vec<_> = events.iter().map(|e| e.event_content()).collect();
    assert_eq!(contents, ["one", "two", "three"]);
}

#[tokio::test]
async fn test_fetch_fails_twice_then_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("finally"))
        .mount(&mock_server)
        .await;

    let delay = Duration::from_millis(25);
    let fetcher = test_fetcher(delay);
    let started = Instant::now();

    let body = fetcher
        .fetch(&format!("{}/flaky", mock_server.uri()))
        .await
        .expect("Fetch should eventually succeed");

    assert_eq!(body, "finally");
    assert!(started.elapsed() >= delay * 2);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_fetch_gives_up_after_max_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(Duration::from_millis(5));
    let result = fetcher.fetch(&format!("{}/down", mock_server.uri())).await;

    assert!(matches!(
        result,
        Err(FetchError::RetriesExhausted { attempts: 3, .. })
    ));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_fetch_does_not_retry_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(Duration::from_millis(5));
    let result = fetcher.fetch(&format!("{}/missing", mock_server.uri())).await;

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_fetch_unreachable_host_is_bounded() {
    // Nothing listens on port 1
    let fetcher = test_fetcher(Duration::from_millis(5));
    let result = fetcher.fetch("http://127.0.0.1:1/gone").await;

    assert!(matches!(result, Err(FetchError::RetriesExhausted { attempts: 3, .. })));
}

#[tokio::test]
async fn test_crawl_then_register() {
    let mock_server = MockServer::start().await;
    mount_february(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_partial_json(serde_json::json!({
            "isTest": true,
            "event": { "extraFields": { "source": "everystocks.com", "production": true } }
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server.uri(), 2018, 2);
    config.registration.test_mode = true;
    let registration = config.registration.clone();

    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let events = coordinator.crawl_all().await.expect("Crawl failed");

    let registrar = HttpRegistrar::new(reqwest::Client::new(), &registration);
    let report = submit_all(&events, &registrar, Duration::ZERO).await;

    assert_eq!(report.total, 3);
    assert_eq!(report.submitted, 3);
    assert_eq!(report.failed, 0);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_rejected_registration_is_counted() {
    let mock_server = MockServer::start().await;
    mount_february(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri(), 2018, 2);
    let registration = config.registration.clone();

    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let events = coordinator.crawl_all().await.expect("Crawl failed");

    let registrar = HttpRegistrar::new(reqwest::Client::new(), &registration);
    let report = submit_all(&events, &registrar, Duration::ZERO).await;

    assert_eq!(report.submitted, 0);
    assert_eq!(report.failed, 3);
}
