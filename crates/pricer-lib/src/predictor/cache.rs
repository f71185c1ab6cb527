//! Process-scoped model cache
//!
//! The artifact is read once per process. The first successful `load()`
//! stores the model in a one-time cell; every later call hands out the same
//! `Arc` without touching the source. A failed load stores nothing and the
//! error goes straight back to the caller. There is no teardown: the model
//! lives until the process exits.

use super::artifact::{ArtifactSource, FileSource};
use super::inference::PricingModel;
use crate::error::ArtifactError;
use crate::observability::PricerMetrics;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{error, info};

pub struct ModelCache {
    source: Box<dyn ArtifactSource>,
    model: OnceLock<Arc<PricingModel>>,
    // Serializes first loads so concurrent callers read the source once
    init: Mutex<()>,
    loads: AtomicU64,
    metrics: Option<PricerMetrics>,
}

impl ModelCache {
    pub fn new(source: impl ArtifactSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            model: OnceLock::new(),
            init: Mutex::new(()),
            loads: AtomicU64::new(0),
            metrics: None,
        }
    }

    /// Count artifact reads in the process metrics as well
    pub fn with_metrics(mut self, metrics: PricerMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Cache over an artifact file
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(FileSource::new(path))
    }

    /// Return the loaded model, reading the artifact on first use
    pub fn load(&self) -> Result<Arc<PricingModel>, ArtifactError> {
        if let Some(model) = self.model.get() {
            return Ok(Arc::clone(model));
        }

        // The guard protects no data, so a poisoned lock is still usable
        let _guard = self.init.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(model) = self.model.get() {
            return Ok(Arc::clone(model));
        }

        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(metrics) = &self.metrics {
            metrics.inc_artifact_loads();
        }
        let location = self.source.location();
        let model = match PricingModel::load(self.source.as_ref()) {
            Ok(model) => Arc::new(model),
            Err(e) => {
                error!(location = %location, error = %e, "Failed to load model artifact");
                return Err(e);
            }
        };

        info!(
            location = %location,
            estimator = model.estimator_kind(),
            inputs = model.input_width(),
            "Model artifact loaded"
        );
        Ok(Arc::clone(self.model.get_or_init(|| model)))
    }

    /// The model if it has already been loaded
    pub fn get(&self) -> Option<Arc<PricingModel>> {
        self.model.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Number of times the artifact source has been read
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn location(&self) -> String {
        self.source.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureRecord;
    use crate::predictor::testing::{linear_manifest, MemorySource};
    use crate::predictor::Predictor;

    /// Forwards to a shared MemorySource so the test can read its counter
    struct Shared(Arc<MemorySource>);

    impl ArtifactSource for Shared {
        fn read_manifest(&self) -> Result<Vec<u8>, ArtifactError> {
            self.0.read_manifest()
        }

        fn read_sibling(&self, relative: &str) -> Result<Vec<u8>, ArtifactError> {
            self.0.read_sibling(relative)
        }

        fn location(&self) -> String {
            self.0.location()
        }
    }

    #[test]
    fn test_sequential_predicts_read_artifact_once() {
        let source = Arc::new(MemorySource::new(&linear_manifest()));
        let cache = ModelCache::new(Shared(source.clone()));
        assert!(!cache.is_loaded());

        let record = FeatureRecord::default();
        let first = cache.load().unwrap().predict(&record).unwrap();
        let second = cache.load().unwrap().predict(&record).unwrap();

        assert_eq!(first.price, second.price);
        assert_eq!(source.reads(), 1);
        assert_eq!(cache.load_count(), 1);
        assert!(cache.is_loaded());
    }

    #[test]
    fn test_load_returns_same_instance() {
        let cache = ModelCache::new(MemorySource::new(&linear_manifest()));
        let a = cache.load().unwrap();
        let b = cache.load().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &cache.get().unwrap()));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache = ModelCache::new(MemorySource::empty());
        assert!(matches!(cache.load(), Err(ArtifactError::NotFound { .. })));
        assert!(cache.load().is_err());
        assert_eq!(cache.load_count(), 2);
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_missing_file_propagates() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = ModelCache::from_path(dir.path().join("car_price_pipeline.json"));
        let err = cache.load().unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound { .. }));
        assert!(cache.location().ends_with("car_price_pipeline.json"));
    }

    #[test]
    fn test_concurrent_first_load_reads_once() {
        let source = Arc::new(MemorySource::new(&linear_manifest()));
        let cache = Arc::new(ModelCache::new(Shared(source.clone())));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.load().map(|m| m.model_version().to_string()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), "test-ridge");
        }
        assert_eq!(source.reads(), 1);
    }

    #[test]
    fn test_artifact_load_metric_follows_source_reads() {
        let metrics = PricerMetrics::new();
        let before = metrics.artifact_loads();

        let source = Arc::new(MemorySource::new(&linear_manifest()));
        let cache = Arc::new(ModelCache::new(Shared(source.clone())).with_metrics(metrics.clone()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.load().is_ok())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }

        assert_eq!(metrics.artifact_loads() - before, 1);

        let failing = ModelCache::new(MemorySource::empty()).with_metrics(metrics.clone());
        assert!(failing.load().is_err());
        assert!(failing.load().is_err());
        assert_eq!(metrics.artifact_loads() - before, 3);
    }
}
