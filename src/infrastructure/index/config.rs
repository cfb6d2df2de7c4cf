//! Vector index configuration

use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::{DomainError, SimilarityMetric};

/// Settings for the in-memory index and its checkpoint
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    #[serde(default)]
    pub metric: SimilarityMetric,
    /// Entry count at which searches switch from exact scan to the HNSW graph
    #[serde(default = "default_ann_threshold")]
    pub ann_threshold: usize,
    #[serde(default = "default_hnsw_m")]
    pub hnsw_m: usize,
    #[serde(default = "default_ef_construction")]
    pub ef_construction: usize,
    #[serde(default = "default_ef_search")]
    pub ef_search: usize,
    /// Directory for `manifest.json` and `entries.json`; no checkpointing when unset
    #[serde(default)]
    pub checkpoint_dir: Option<PathBuf>,
}

fn default_ann_threshold() -> usize {
    2048
}

fn default_hnsw_m() -> usize {
    16
}

fn default_ef_construction() -> usize {
    200
}

fn default_ef_search() -> usize {
    64
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            metric: SimilarityMetric::default(),
            ann_threshold: default_ann_threshold(),
            hnsw_m: default_hnsw_m(),
            ef_construction: default_ef_construction(),
            ef_search: default_ef_search(),
            checkpoint_dir: None,
        }
    }
}

impl IndexConfig {
    pub fn with_metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_ann_threshold(mut self, threshold: usize) -> Self {
        self.ann_threshold = threshold;
        self
    }

    pub fn with_checkpoint_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.checkpoint_dir = Some(dir.into());
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.hnsw_m < 2 {
            return Err(DomainError::configuration("index.hnsw_m must be at least 2"));
        }

        if self.ef_construction == 0 || self.ef_search == 0 {
            return Err(DomainError::configuration(
                "index.ef_construction and index.ef_search must be greater than 0",
            ));
        }

        Ok(())
    }
}
