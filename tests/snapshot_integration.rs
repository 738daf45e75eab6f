use std::path::Path;
use std::sync::Arc;

use meteolink::collector::ProviderMonitor;
use meteolink::config::{parse_config, MeteolinkConfig};
use meteolink::readings::{Field, StationStatus};
use meteolink::service::MeteoService;
use serde_json::Value;

fn create_test_config(server_url: &str, data_dir: &Path) -> MeteolinkConfig {
    let yaml = format!(
        r#"
storage:
  data_dir: {data_dir}
  timezone: Europe/Rome
snapshot_cache_ttl_secs: 0
providers:
  - id: limet
    kind: limet
    base_url: "{server_url}/stazioni/{{ref}}/realtimegauges.txt"
    timeout_secs: 5
    max_concurrency: 2
    stations:
      - id: A
        display_name: Alpha
        latitude: 44.461
        longitude: 8.987
      - id: B
        display_name: Bravo
        latitude: 44.43
        longitude: 8.71
      - id: C
        display_name: Charlie
        latitude: 44.42
        longitude: 8.92
"#,
        data_dir = data_dir.display(),
        server_url = server_url,
    );
    parse_config(&yaml).unwrap()
}

async fn mock_three_stations(server: &mut mockito::ServerGuard) -> Vec<mockito::Mock> {
    vec![
        server
            .mock("GET", "/stazioni/A/realtimegauges.txt")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body(r#"{"temp":"12,5","SensorContactLost":"0"}"#)
            .create_async()
            .await,
        server
            .mock("GET", "/stazioni/B/realtimegauges.txt")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await,
        server
            .mock("GET", "/stazioni/C/realtimegauges.txt")
            .with_status(200)
            .with_body(r#"{"temp":"9,9","SensorContactLost":"1"}"#)
            .create_async()
            .await,
    ]
}

#[tokio::test]
async fn test_three_station_snapshot() {
    let mut server = mockito::Server::new_async().await;
    let mocks = mock_three_stations(&mut server).await;
    let dir = tempfile::TempDir::new().unwrap();

    let service = MeteoService::from_config(create_test_config(&server.url(), dir.path())).unwrap();
    let snapshot = service.get_snapshot("limet").await.unwrap();

    let a = snapshot.reading("A").unwrap();
    assert_eq!(a.status(), StationStatus::Active);
    assert_eq!(a.get(Field::Temperature), Some(12.5));
    assert_eq!(snapshot.reading("B").unwrap().status(), StationStatus::Inactive);
    assert_eq!(snapshot.reading("C").unwrap().status(), StationStatus::Inactive);

    let ndjson = snapshot.to_ndjson().unwrap();
    let lines: Vec<Value> = ndjson
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 4);

    let header = lines[0].as_object().unwrap();
    assert_eq!(header.len(), 1);
    let timestamp = header["timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with('Z'));
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());

    assert_eq!(lines[1]["S"], "0");
    assert_eq!(lines[1]["N"], "Alpha");
    assert_eq!(lines[1]["T"], 12.5);
    assert_eq!(lines[1]["LAT"], 44.461);
    assert_eq!(lines[1]["LON"], 8.987);
    assert_eq!(lines[2], serde_json::json!({"S": "1", "N": "Bravo"}));
    assert_eq!(lines[3], serde_json::json!({"S": "1", "N": "Charlie"}));

    for mock in mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_one_cycle_persists_the_snapshot() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = mock_three_stations(&mut server).await;
    let dir = tempfile::TempDir::new().unwrap();

    let config = create_test_config(&server.url(), dir.path());
    let provider = config.providers[0].clone();
    let service = Arc::new(MeteoService::from_config(config).unwrap());

    let report = ProviderMonitor::new(provider, Arc::clone(&service))
        .run_cycle()
        .await
        .unwrap();
    assert_eq!(report.stations, 3);
    assert_eq!(report.archived, 1);
    assert_eq!(report.logged, 3);

    let archive: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("daily/limet/A.json")).unwrap(),
    )
    .unwrap();
    let days = archive.as_object().unwrap();
    assert_eq!(days.len(), 1);
    let hours = days.values().next().unwrap().as_object().unwrap();
    assert_eq!(hours.values().next().unwrap(), &serde_json::json!([12.5]));

    let rolling: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("rolling/limet/B.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(rolling["station"], "B");
    assert_eq!(rolling["data"][0]["S"], "1");
    assert_eq!(rolling["data"][0]["N"], "Bravo");

    assert!(!dir.path().join("daily/limet/B.json").exists());
    assert!(!dir.path().join("daily/limet/C.json").exists());
}

#[tokio::test]
async fn test_unknown_station_is_rejected() {
    let server = mockito::Server::new_async().await;
    let dir = tempfile::TempDir::new().unwrap();
    let service = MeteoService::from_config(create_test_config(&server.url(), dir.path())).unwrap();

    let result = service.get_single_station("limet", "Z").await;
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Unknown station 'Z'"));
}
