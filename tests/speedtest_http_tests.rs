use serde_json::json;
use speedtest_reporter::collectors::{
    HttpSpeedtestClient, MeasurementClient, MeasurementError, SamplerConfig, SpeedSampler,
};
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_server_list(server: &MockServer) {
    let uri = server.uri();
    let servers = json!([
        {
            "id": "1",
            "name": "Reston, VA",
            "country": "United States",
            "sponsor": "Nearby ISP",
            "host": "near.example:8080",
            "url": format!("{uri}/near/upload.php"),
            "distance": 5
        },
        {
            "id": 2,
            "name": "Baltimore, MD",
            "country": "United States",
            "sponsor": "Other ISP",
            "host": "far.example:8080",
            "url": format!("{uri}/far/upload.php"),
            "distance": 60
        }
    ]);
    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(servers))
        .mount(server)
        .await;
}

async fn mount_latency(server: &MockServer, dir: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/{dir}/latency.txt")))
        .respond_with(ResponseTemplate::new(status).set_body_string("test=test"))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> HttpSpeedtestClient {
    HttpSpeedtestClient::new(format!("{}/servers", server.uri()), Duration::from_secs(5))
        .expect("client should build")
}

#[tokio::test]
async fn test_lists_candidates_with_numeric_and_string_ids() {
    let server = MockServer::start().await;
    mount_server_list(&server).await;
    let mut client = client_for(&server);

    let candidates = client.list_candidate_servers().await.unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].id, "1");
    assert_eq!(candidates[1].id, "2");
    assert_eq!(candidates[1].distance, Some(60.0));
}

#[tokio::test]
async fn test_selection_skips_server_failing_its_probe() {
    let server = MockServer::start().await;
    mount_server_list(&server).await;
    mount_latency(&server, "near", 500).await;
    mount_latency(&server, "far", 200).await;
    let mut client = client_for(&server);

    assert_eq!(client.last_ping_ms(), None);
    let best = client.select_best_server().await.unwrap();

    assert_eq!(best.id, "2");
    let ping = best.latency_ms.expect("selected server carries its latency");
    assert!(ping >= 0.0 && ping < 3_600_000.0);
    assert_eq!(client.last_ping_ms(), Some(ping));
    assert_eq!(client.best_server().map(|s| s.id.as_str()), Some("2"));
}

#[tokio::test]
async fn test_no_reachable_server() {
    let server = MockServer::start().await;
    mount_server_list(&server).await;
    let mut client = client_for(&server);

    let err = client.select_best_server().await.unwrap_err();

    assert!(matches!(err, MeasurementError::NoReachableServer { candidates: 2 }));
}

#[tokio::test]
async fn test_empty_server_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    let mut client = client_for(&server);

    let err = client.list_candidate_servers().await.unwrap_err();

    assert!(matches!(err, MeasurementError::NoServers));
}

#[tokio::test]
async fn test_malformed_server_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    let mut client = client_for(&server);

    let err = client.list_candidate_servers().await.unwrap_err();

    assert!(matches!(err, MeasurementError::ServerList { .. }));
}

#[tokio::test]
async fn test_server_list_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let mut client = client_for(&server);

    let err = client.list_candidate_servers().await.unwrap_err();

    assert!(matches!(err, MeasurementError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_measuring_before_selection_fails() {
    let server = MockServer::start().await;
    let mut client = client_for(&server);

    let err = client.measure_download().await.unwrap_err();

    assert!(matches!(err, MeasurementError::NoServerSelected));
}

#[tokio::test]
async fn test_download_fetches_each_image_size() {
    let server = MockServer::start().await;
    mount_server_list(&server).await;
    mount_latency(&server, "near", 200).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/near/random\d+x\d+\.jpg$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
        .expect(2)
        .mount(&server)
        .await;
    let mut client = client_for(&server).with_download_sizes(vec![350, 500]);

    client.select_best_server().await.unwrap();
    let rate = client.measure_download().await.unwrap();

    assert!(rate > 0.0, "rate was {rate}");
}

#[tokio::test]
async fn test_download_reports_http_status() {
    let server = MockServer::start().await;
    mount_server_list(&server).await;
    mount_latency(&server, "near", 200).await;
    let mut client = client_for(&server).with_download_sizes(vec![350]);

    client.select_best_server().await.unwrap();
    let err = client.measure_download().await.unwrap_err();

    match err {
        MeasurementError::Status { url, status } => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/near/random350x350.jpg"), "{url}");
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_posts_each_payload() {
    let server = MockServer::start().await;
    mount_server_list(&server).await;
    mount_latency(&server, "near", 200).await;
    Mock::given(method("POST"))
        .and(path("/near/upload.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("size=2048"))
        .expect(2)
        .mount(&server)
        .await;
    let mut client = client_for(&server).with_upload_sizes(vec![1024, 2048]);

    client.select_best_server().await.unwrap();
    let rate = client.measure_upload().await.unwrap();

    assert!(rate > 0.0, "rate was {rate}");
}

#[tokio::test]
async fn test_sampler_over_http_produces_samples() {
    let server = MockServer::start().await;
    mount_server_list(&server).await;
    mount_latency(&server, "near", 200).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/near/random\d+x\d+\.jpg$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 1024]))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/near/upload.php"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let client = client_for(&server)
        .with_download_sizes(vec![350])
        .with_upload_sizes(vec![1024]);
    let config = SamplerConfig {
        duration: Duration::from_millis(300),
        interval: Duration::from_millis(100),
    };
    let mut sampler = SpeedSampler::new(client, config);

    let output = sampler.run("us-east").await.unwrap();

    assert_eq!(output.server.id, "1");
    assert!(!output.samples.is_empty());
    let ping = output.server.latency_ms.unwrap();
    assert!(output.samples.iter().all(|s| s.ping_ms == ping));
    assert!(output.samples.iter().all(|s| s.download_speed_mbps >= 0.0));
}
