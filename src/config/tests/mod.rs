#[cfg(test)]
mod tests {
    use std::io::Write;
    use tempfile::NamedTempFile;
    use crate::config::parser::{load_config, parse_config, ConfigError};
    use crate::config::models::ProviderKind;
    use crate::readings::Field;

    // Helper function to create a temporary file with content
    fn create_temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_valid_configuration() {
        let config_yaml = r#"
        storage:
          data_dir: /var/lib/meteolink
          timezone: Europe/Rome
        providers:
          - id: limet
            kind: limet
            timeout_secs: 10
            stations:
              - id: Molassana
                display_name: Molassana
                latitude: 44.461
                longitude: 8.987
                upstream_ref: terzereti
              - id: Fabbriche
                display_name: Fabbriche
                latitude: 44.446
                longitude: 8.714
                upstream_ref: meteo-fabbriche-brusinetti
          - id: cml
            kind: cml
        "#;

        let temp_file = create_temp_file(config_yaml);
        let config = load_config(temp_file.path()).expect("Failed to load valid config");

        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.storage.data_dir.to_str(), Some("/var/lib/meteolink"));

        let limet = config.provider("limet").unwrap();
        assert_eq!(limet.kind, ProviderKind::Limet);
        assert_eq!(limet.timeout_secs, 10);
        assert_eq!(limet.stations.len(), 2);
        assert_eq!(limet.stations[0].upstream_key(), "terzereti");
        assert!(!limet.is_discovery());

        let cml = config.provider("cml").unwrap();
        assert!(cml.is_discovery());
        assert!(cml.enabled);
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse_config(
            r#"
            providers:
              - id: torino
                kind: torinometeo
            "#,
        )
        .expect("Failed to parse minimal config");

        assert_eq!(config.storage.timezone, "Europe/Rome");
        assert_eq!(config.storage.rolling_capacity, 144);
        assert_eq!(config.snapshot_cache_ttl_secs, 60);
        assert!(!config.retention.enabled);
        assert!(config.metrics.enabled);
        assert_eq!(config.logging.level, "info");

        let provider = &config.providers[0];
        assert_eq!(provider.poll_interval_secs, 600);
        assert_eq!(provider.max_concurrency, 4);
        assert_eq!(provider.timeout_secs, 15);
        assert!(provider.persist.daily_archive);
        assert!(provider.persist.rolling_log);
        assert_eq!(provider.persist.sample_field, Field::Temperature);
    }

    #[test]
    fn test_upstream_ref_defaults_to_id() {
        let config = parse_config(
            r#"
            providers:
              - id: omirl
                kind: omirl
                stations:
                  - id: GENOV
                    display_name: Genova Centro Funzionale
                    latitude: 44.4
                    longitude: 8.93
            "#,
        )
        .unwrap();

        assert_eq!(config.providers[0].stations[0].upstream_key(), "GENOV");
    }

    #[test]
    fn test_invalid_timezone() {
        let result = parse_config(
            r#"
            storage:
              timezone: Mars/Olympus_Mons
            providers: []
            "#,
        );

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_cron_schedule() {
        let result = parse_config(
            r#"
            retention:
              enabled: true
              schedule: "every night"
            providers: []
            "#,
        );

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_duplicate_station_ids() {
        let result = parse_config(
            r#"
            providers:
              - id: limet
                kind: limet
                stations:
                  - id: Oregina
                    display_name: Oregina
                    latitude: 44.423
                    longitude: 8.928
                  - id: Oregina
                    display_name: Oregina bis
                    latitude: 44.423
                    longitude: 8.928
            "#,
        );

        match result {
            Err(ConfigError::Other(msg)) => assert!(msg.contains("Oregina")),
            other => panic!("Expected duplicate station error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_provider_ids() {
        let result = parse_config(
            r#"
            providers:
              - id: cml
                kind: cml
              - id: cml
                kind: cml
            "#,
        );

        assert!(matches!(result, Err(ConfigError::Other(_))));
    }

    #[test]
    fn test_per_station_provider_requires_stations() {
        let result = parse_config(
            r#"
            providers:
              - id: limet
                kind: limet
            "#,
        );

        match result {
            Err(ConfigError::Other(msg)) => assert!(msg.contains("at least one configured station")),
            other => panic!("Expected missing station error, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let result = parse_config(
            r#"
            providers:
              - id: limet
                kind: limet
                stations:
                  - id: Nowhere
                    display_name: Nowhere
                    latitude: 144.0
                    longitude: 8.9
            "#,
        );

        assert!(matches!(result, Err(ConfigError::Other(_))));
    }

    #[test]
    fn test_station_id_with_path_separator() {
        let result = parse_config(
            r#"
            providers:
              - id: cml
                kind: cml
                stations:
                  - id: ../escape
                    display_name: Escape
                    latitude: 45.0
                    longitude: 9.0
            "#,
        );

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_poll_interval_too_short() {
        let result = parse_config(
            r#"
            providers:
              - id: cml
                kind: cml
                poll_interval_secs: 1
            "#,
        );

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_base_url_template_accepted() {
        let config = parse_config(
            r#"
            providers:
              - id: limet
                kind: limet
                base_url: "http://localhost:8080/stazioni/{ref}/realtimegauges.txt"
                stations:
                  - id: Molassana
                    display_name: Molassana
                    latitude: 44.461
                    longitude: 8.987
            "#,
        )
        .unwrap();

        assert!(config.providers[0].base_url.is_some());
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/meteolink/config.yaml");
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }

    #[test]
    fn test_example_configuration_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.yaml");
        let config = load_config(path).unwrap();

        let limet = config.provider("limet").unwrap();
        assert_eq!(limet.kind, ProviderKind::Limet);
        assert_eq!(limet.stations.len(), 46);
        assert_eq!(limet.station("Molassana").unwrap().upstream_key(), "terzereti");
        assert!(config.provider("cml").unwrap().is_discovery());
    }
}
