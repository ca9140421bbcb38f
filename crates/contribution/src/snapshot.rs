//! Persisted distance cache between runs

use citeforge_common::errors::{AppError, Result};
use citeforge_scoring::{DistanceCache, DistanceSnapshot};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Read a snapshot, `None` if the file does not exist yet
pub async fn load(path: &Path) -> Result<Option<DistanceCache>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "No distance snapshot yet, starting empty");
            return Ok(None);
        }
        Err(e) => return Err(AppError::io(path, e)),
    };

    let snapshot: DistanceSnapshot = serde_json::from_slice(&bytes).map_err(|e| AppError::Snapshot {
        message: format!("{}: {}", path.display(), e),
    })?;
    let cache = DistanceCache::from_snapshot(snapshot).map_err(|e| AppError::Snapshot {
        message: format!("{}: {}", path.display(), e),
    })?;

    info!(path = %path.display(), pairs = cache.len(), "Loaded distance snapshot");
    Ok(Some(cache))
}

/// Write the cache next to `path` and move it into place
pub async fn save(path: &Path, cache: &DistanceCache) -> Result<()> {
    let json = serde_json::to_vec_pretty(&cache.snapshot())?;

    let staging = path.with_extension("tmp");
    tokio::fs::write(&staging, json)
        .await
        .map_err(|e| AppError::io(&staging, e))?;
    tokio::fs::rename(&staging, path)
        .await
        .map_err(|e| AppError::io(path, e))?;

    info!(path = %path.display(), pairs = cache.len(), "Saved distance snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("distances.json");

        let cache = DistanceCache::new();
        cache.put("1", "2", 0.25);
        save(&path, &cache).await.unwrap();

        let restored = load(&path).await.unwrap().unwrap();
        assert_eq!(restored.get("2", "1"), Some(0.25));
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.json")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bad_snapshots() {
        let dir = tempfile::tempdir().unwrap();

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "not json").unwrap();
        assert!(matches!(load(&garbage).await.unwrap_err(), AppError::Snapshot { .. }));

        let stale = dir.path().join("stale.json");
        std::fs::write(&stale, r#"{"version": 0, "distances": {}}"#).unwrap();
        let err = load(&stale).await.unwrap_err();
        assert!(err.to_string().contains("unsupported snapshot version"));
        assert_eq!(err.exit_code(), 74);
    }
}
