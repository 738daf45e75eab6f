#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use tempfile::TempDir;

    use crate::collector::{CollectorManager, CycleReport, ProviderMonitor};
    use crate::config::MeteolinkConfig;
    use crate::providers::SourceAdapter;
    use crate::readings::Field;
    use crate::service::MeteoService;
    use crate::test_utils::{
        DescriptorFactory, MeteolinkConfigFactory, MockAdapter, MockResponse,
        ProviderConfigFactory, StationConfigFactory,
    };

    fn config(dir: &TempDir) -> MeteolinkConfig {
        MeteolinkConfigFactory::create(
            dir.path(),
            vec![ProviderConfigFactory::limet(
                "limet",
                vec![
                    StationConfigFactory::create("Molassana", 44.461, 8.987),
                    StationConfigFactory::create("Fabbriche", 44.43, 8.71),
                    StationConfigFactory::create("Oregina", 44.42, 8.92),
                ],
            )],
        )
    }

    fn service(config: MeteolinkConfig) -> Arc<MeteoService> {
        let adapter = MockAdapter::new(DescriptorFactory::station_document("limet", "http://localhost/{ref}"))
            .respond("Molassana", MockResponse::Body(json!({"temp": "20,1"})))
            .respond("Fabbriche", MockResponse::Body(json!({"hum": "70"})))
            .respond("Oregina", MockResponse::Body(json!({"temp": "19,0", "status": "1"})));

        let mut adapters: HashMap<String, Arc<dyn SourceAdapter>> = HashMap::new();
        adapters.insert("limet".to_string(), Arc::new(adapter));
        Arc::new(MeteoService::with_adapters(config, adapters).unwrap())
    }

    #[tokio::test]
    async fn test_cycle_persists_samples_and_rolling_entries() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let provider = config.providers[0].clone();
        let service = service(config);
        let monitor = ProviderMonitor::new(provider, Arc::clone(&service));

        let report = monitor.run_cycle().await.unwrap();

        // Only Molassana is active with a temperature; every station gets a log entry
        assert_eq!(
            report,
            CycleReport {
                stations: 3,
                archived: 1,
                logged: 3,
                failed_writes: 0
            }
        );

        let archive = service.get_archive("limet", "Molassana").await.unwrap();
        let date = archive.dates().pop().unwrap();
        let hours = archive.hours(&date).unwrap();
        assert_eq!(hours.values().flatten().copied().collect::<Vec<_>>(), vec![20.1]);
        assert!(service.get_archive("limet", "Fabbriche").await.unwrap().is_empty());

        let log = service.get_rolling_log("limet", "Fabbriche").await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.latest().unwrap().reading.get(Field::Humidity), Some(70.0));
    }

    #[tokio::test]
    async fn test_repeated_cycles_append() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let provider = config.providers[0].clone();
        let service = service(config);
        let monitor = ProviderMonitor::new(provider, Arc::clone(&service));

        for _ in 0..3 {
            monitor.run_cycle().await.unwrap();
        }

        let log = service.get_rolling_log("limet", "Oregina").await.unwrap();
        assert_eq!(log.len(), 3);

        let archive = service.get_archive("limet", "Molassana").await.unwrap();
        let samples: usize = archive
            .dates()
            .iter()
            .filter_map(|d| archive.hours(d))
            .flat_map(|hours| hours.values())
            .map(Vec::len)
            .sum();
        assert_eq!(samples, 3);
    }

    #[tokio::test]
    async fn test_persistence_switches() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.providers[0].persist.rolling_log = false;
        config.providers[0].persist.sample_field = Field::Humidity;
        let provider = config.providers[0].clone();
        let service = service(config);

        let report = ProviderMonitor::new(provider, Arc::clone(&service))
            .run_cycle()
            .await
            .unwrap();

        assert_eq!(report.logged, 0);
        assert_eq!(report.archived, 1);
        assert!(service.get_archive("limet", "Molassana").await.unwrap().is_empty());
        assert!(!service.get_archive("limet", "Fabbriche").await.unwrap().is_empty());
        assert!(!dir.path().join("rolling").exists());
    }

    #[tokio::test]
    async fn test_write_failures_are_counted() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.storage.data_dir = blocker.path().to_path_buf();
        let provider = config.providers[0].clone();
        let service = service(config);

        let report = ProviderMonitor::new(provider, service).run_cycle().await.unwrap();

        assert_eq!(report.archived, 0);
        assert_eq!(report.logged, 0);
        assert_eq!(report.failed_writes, 4);
    }

    #[tokio::test]
    async fn test_manager_runs_until_shutdown() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.providers.push({
            let mut disabled = ProviderConfigFactory::limet("spare", Vec::new());
            disabled.enabled = false;
            disabled
        });
        let spare = MockAdapter::new(DescriptorFactory::station_document("spare", "http://localhost/{ref}"));
        let limet = MockAdapter::new(DescriptorFactory::station_document("limet", "http://localhost/{ref}"))
            .respond("Molassana", MockResponse::Body(json!({"temp": "20,1"})));
        let mut adapters: HashMap<String, Arc<dyn SourceAdapter>> = HashMap::new();
        adapters.insert("limet".to_string(), Arc::new(limet));
        adapters.insert("spare".to_string(), Arc::new(spare));
        let service = Arc::new(MeteoService::with_adapters(config, adapters).unwrap());

        let mut manager = CollectorManager::new(Arc::clone(&service));
        manager.start();
        assert_eq!(manager.running(), 1);

        // The first tick fires immediately
        let log_path = dir.path().join("rolling/limet/Molassana.json");
        for _ in 0..100 {
            if log_path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(log_path.exists());

        tokio::time::timeout(Duration::from_secs(5), manager.shutdown())
            .await
            .expect("monitors stop after shutdown");
        assert_eq!(manager.running(), 0);
    }
}
