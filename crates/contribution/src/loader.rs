//! Document text loading
//!
//! Every `<index>.<ext>` file in the data directory becomes one document
//! keyed by its file stem.

use citeforge_common::errors::{AppError, Result};
use futures::{stream, StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files read at the same time
const READ_CONCURRENCY: usize = 32;

/// Load all document texts from `dir`
pub async fn load_documents(dir: &Path, extension: &str) -> Result<HashMap<String, String>> {
    if extension.is_empty() {
        return Err(AppError::Validation {
            message: "text extension must not be empty".to_string(),
            field: Some("data.text_extension".to_string()),
        });
    }

    let paths = document_paths(dir, extension).await?;
    debug!(dir = %dir.display(), files = paths.len(), "Reading documents");

    let documents: HashMap<String, String> = stream::iter(paths)
        .map(|(index, path)| async move {
            let text = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| AppError::io(&path, e))?;
            Ok::<_, AppError>((index, text))
        })
        .buffer_unordered(READ_CONCURRENCY)
        .try_collect()
        .await?;

    info!(dir = %dir.display(), count = documents.len(), "Loaded documents");
    Ok(documents)
}

async fn document_paths(dir: &Path, extension: &str) -> Result<Vec<(String, PathBuf)>> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::NotFound {
            resource_type: "data directory".to_string(),
            id: dir.display().to_string(),
        },
        _ => AppError::io(dir, e),
    })?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| AppError::io(dir, e))? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let is_file = entry
            .file_type()
            .await
            .map_err(|e| AppError::io(&path, e))?
            .is_file();
        if !is_file {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            paths.push((stem.to_string(), path.clone()));
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_loads_matching_files_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1.txt"), "the cat sat").unwrap();
        fs::write(dir.path().join("27.txt"), "quantum theory").unwrap();
        fs::write(dir.path().join("citations.tsv"), "1\t27\n").unwrap();
        fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let docs = load_documents(dir.path(), "txt").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs["1"], "the cat sat");
        assert_eq!(docs["27"], "quantum theory");
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_documents(dir.path(), "txt").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_documents(&dir.path().join("absent"), "txt").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.exit_code(), 66);
    }

    #[tokio::test]
    async fn test_empty_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_documents(dir.path(), "").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
