//! Mock implementations for testing

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use serde_json::Value;

use crate::config::StationConfig;
use crate::providers::{AdapterError, ProviderDescriptor, RawRecord, SourceAdapter};

/// Configuration for controlling mock failures
#[derive(Debug, Clone, Default)]
pub struct FailureConfig {
    pub fail_all: Option<AdapterError>,
    pub fail_after_calls: Option<usize>,
}

impl FailureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_all(error: AdapterError) -> Self {
        Self {
            fail_all: Some(error),
            fail_after_calls: None,
        }
    }

    pub fn fail_after(calls: usize) -> Self {
        Self {
            fail_after_calls: Some(calls),
            ..Default::default()
        }
    }
}

/// Scripted outcome of one station fetch
#[derive(Debug, Clone)]
pub enum MockResponse {
    Body(Value),
    Error(AdapterError),
    Delayed(Duration, Value),
}

/// Source adapter answering from scripted responses
///
/// Stations without a scripted response fail with an HTTP 404.
pub struct MockAdapter {
    descriptor: ProviderDescriptor,
    responses: RwLock<HashMap<String, MockResponse>>,
    network: RwLock<Vec<RawRecord>>,
    failure_config: FailureConfig,
    call_count: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockAdapter {
    pub fn new(descriptor: ProviderDescriptor) -> Self {
        Self::with_failures(descriptor, FailureConfig::default())
    }

    pub fn with_failures(descriptor: ProviderDescriptor, failure_config: FailureConfig) -> Self {
        Self {
            descriptor,
            responses: RwLock::new(HashMap::new()),
            network: RwLock::new(Vec::new()),
            failure_config,
            call_count: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Script the response for a station's upstream key
    pub fn respond(self, upstream_key: &str, response: MockResponse) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(upstream_key.to_string(), response);
        self
    }

    /// Script the rows returned by network fetches
    pub fn with_network(self, records: Vec<RawRecord>) -> Self {
        *self.network.write().unwrap() = records;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Highest number of fetches observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), AdapterError> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(error) = &self.failure_config.fail_all {
            return Err(error.clone());
        }
        match self.failure_config.fail_after_calls {
            Some(limit) if count > limit => Err(AdapterError::Network("mock failure".to_string())),
            _ => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for MockAdapter {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn fetch_station(&self, station: &StationConfig) -> Result<RawRecord, AdapterError> {
        self.check_failure()?;

        let response = self
            .responses
            .read()
            .unwrap()
            .get(station.upstream_key())
            .cloned();

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let result = match response {
            Some(MockResponse::Body(body)) => Ok(body),
            Some(MockResponse::Delayed(delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(body)
            }
            Some(MockResponse::Error(error)) => Err(error),
            None => Err(AdapterError::HttpStatus(404)),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result.map(|body| RawRecord::new(station.id.clone(), body).with_station(station))
    }

    async fn fetch_network(&self) -> Result<Vec<RawRecord>, AdapterError> {
        self.check_failure()?;
        Ok(self.network.read().unwrap().clone())
    }
}
