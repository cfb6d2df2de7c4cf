//! On-disk index checkpoints
//!
//! A checkpoint is a directory holding `manifest.json` and `entries.json`. The manifest
//! is written last, so a directory without one is treated as having no checkpoint.
//! Loading checks the recorded embedding model and dimension against the running
//! embedder before anything reaches the index.
//!
//! Saves and clears are serialised, and a save snapshots the index only after it holds
//! the lock, so the files on disk always reflect the latest completed operation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::{DomainError, IndexEntry, SimilarityMetric, VectorIndex};

pub const FORMAT_VERSION: u32 = 1;

const MANIFEST_FILE: &str = "manifest.json";
const ENTRIES_FILE: &str = "entries.json";

/// Identity of a checkpointed index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointManifest {
    pub format_version: u32,
    pub embedding_model: String,
    pub dimensions: Option<usize>,
    pub metric: SimilarityMetric,
    pub entry_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Saves and restores a `VectorIndex` under one directory
#[derive(Debug, Clone)]
pub struct IndexCheckpoint {
    dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl IndexCheckpoint {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    fn entries_path(&self) -> PathBuf {
        self.dir.join(ENTRIES_FILE)
    }

    /// Write the full contents of `index`
    pub async fn save(
        &self,
        index: &dyn VectorIndex,
        embedding_model: &str,
    ) -> Result<CheckpointManifest, DomainError> {
        let _guard = self.write_lock.lock().await;

        let entries = index.entries().await;
        let manifest = CheckpointManifest {
            format_version: FORMAT_VERSION,
            embedding_model: embedding_model.to_string(),
            dimensions: index.dimension().await,
            metric: index.metric(),
            entry_count: entries.len(),
            created_at: Utc::now(),
        };

        tokio::fs::create_dir_all(&self.dir).await?;

        // Drop the old manifest first so a crash mid-write never pairs it with new entries
        self.remove_if_exists(&self.manifest_path()).await?;
        write_json(&self.entries_path(), &entries).await?;
        write_json(&self.manifest_path(), &manifest).await?;

        debug!(dir = %self.dir.display(), entries = manifest.entry_count, "Checkpoint saved");
        Ok(manifest)
    }

    /// Read the manifest, if a checkpoint exists
    pub async fn manifest(&self) -> Result<Option<CheckpointManifest>, DomainError> {
        let path = self.manifest_path();
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }

        read_json(&path).await.map(Some)
    }

    /// Restore a checkpoint into `index`, replacing its contents.
    ///
    /// Returns the number of entries loaded, or `None` when there is no checkpoint.
    pub async fn load(
        &self,
        index: &dyn VectorIndex,
        embedding_model: &str,
        dimensions: Option<usize>,
    ) -> Result<Option<usize>, DomainError> {
        let Some(manifest) = self.manifest().await? else {
            return Ok(None);
        };

        verify(&manifest, embedding_model, dimensions, index.metric())?;

        let entries: Vec<IndexEntry> = read_json(&self.entries_path()).await?;
        if entries.len() != manifest.entry_count {
            return Err(DomainError::storage(format!(
                "checkpoint lists {} entries but {} were found",
                manifest.entry_count,
                entries.len()
            )));
        }

        index.clear().await;
        let loaded = index.insert_batch(entries).await?;

        info!(
            dir = %self.dir.display(),
            entries = loaded,
            model = %manifest.embedding_model,
            "Checkpoint loaded"
        );
        Ok(Some(loaded))
    }

    /// Delete the checkpoint files
    pub async fn clear(&self) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;

        self.remove_if_exists(&self.manifest_path()).await?;
        self.remove_if_exists(&self.entries_path()).await?;
        Ok(())
    }

    async fn remove_if_exists(&self, path: &Path) -> Result<(), DomainError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn verify(
    manifest: &CheckpointManifest,
    embedding_model: &str,
    dimensions: Option<usize>,
    metric: SimilarityMetric,
) -> Result<(), DomainError> {
    if manifest.format_version != FORMAT_VERSION {
        return Err(DomainError::storage(format!(
            "unsupported checkpoint format version {}",
            manifest.format_version
        )));
    }

    if manifest.embedding_model != embedding_model {
        return Err(DomainError::model_mismatch(
            &manifest.embedding_model,
            embedding_model,
        ));
    }

    if let (Some(stored), Some(configured)) = (manifest.dimensions, dimensions) {
        if stored != configured {
            return Err(DomainError::dimension_mismatch(configured, stored));
        }
    }

    if manifest.metric != metric {
        return Err(DomainError::configuration(format!(
            "checkpoint uses {} similarity, index is configured for {}",
            manifest.metric.as_str(),
            metric.as_str()
        )));
    }

    Ok(())
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DomainError> {
    let data = serde_json::to_vec(value)
        .map_err(|e| DomainError::storage(format!("failed to encode {}: {}", path.display(), e)))?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, data).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, DomainError> {
    let data = tokio::fs::read(path).await?;
    serde_json::from_slice(&data)
        .map_err(|e| DomainError::storage(format!("failed to decode {}: {}", path.display(), e)))
}
