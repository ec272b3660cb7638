//! Catalog acquisition: MPC download with a cached copy on disk.

use anyhow::{Context, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::mpc::{parse_comet_catalog, CometElements};

pub const MPC_COMET_URL: &str = "https://www.minorplanetcenter.net/iau/MPCORB/CometEls.txt";
const CACHE_FILE_NAME: &str = "CometEls.txt";

/// Where the comet catalog comes from
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// Fresh download, stored under `data_dir`; the stored copy is reused if the download fails
    Download { url: String, data_dir: PathBuf },
    /// A local file, no network access
    Local(PathBuf),
}

impl CatalogSource {
    pub fn mpc(data_dir: impl Into<PathBuf>) -> Self {
        CatalogSource::Download {
            url:      MPC_COMET_URL.to_string(),
            data_dir: data_dir.into(),
        }
    }
}

/// Load and parse the comet catalog from `source`.
pub async fn load_comet_catalog(source: &CatalogSource) -> Result<Vec<CometElements>> {
    let text = match source {
        CatalogSource::Local(path) => {
            tracing::info!("Reading comet catalog from {}", path.display());
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read catalog {}", path.display()))?
        }
        CatalogSource::Download { url, data_dir } => {
            let cache_path = data_dir.join(CACHE_FILE_NAME);
            match download_catalog(url, &cache_path).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Catalog download failed ({:#}), using cached copy", e);
                    tokio::fs::read_to_string(&cache_path).await.with_context(|| {
                        format!(
                            "Catalog download failed and no cached copy at {}",
                            cache_path.display()
                        )
                    })?
                }
            }
        }
    };

    let comets = parse_comet_catalog(&text);
    if comets.is_empty() {
        anyhow::bail!("Comet catalog contains no parsable entries");
    }
    tracing::info!("Loaded {} comets from catalog", comets.len());
    Ok(comets)
}

async fn download_catalog(url: &str, cache_path: &Path) -> Result<String> {
    tracing::info!("Downloading comet catalog from {}", url);

    let client = Client::builder()
        .timeout(Duration::from_secs(60))
        .user_agent("stargaze/0.1 (astrophotography planner)")
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .context("Failed to GET comet catalog")?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP error: {}", response.status());
    }

    let content = response
        .text()
        .await
        .context("Failed to read catalog response body")?;

    if let Some(parent) = cache_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(cache_path, &content)
        .await
        .context("Failed to write catalog copy")?;

    tracing::info!("Stored comet catalog at {}", cache_path.display());
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::mpc::tests::{HALE_BOPP, HALLEY};

    #[tokio::test]
    async fn test_load_local_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CometEls.txt");
        std::fs::write(&path, format!("{}\n{}\n", HALE_BOPP, HALLEY)).unwrap();

        let comets = load_comet_catalog(&CatalogSource::Local(path)).await.unwrap();
        assert_eq!(comets.len(), 2);
    }

    #[tokio::test]
    async fn test_download_failure_falls_back_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CACHE_FILE_NAME), HALLEY).unwrap();

        let source = CatalogSource::Download {
            url:      "http://127.0.0.1:9/CometEls.txt".to_string(),
            data_dir: dir.path().to_path_buf(),
        };
        let comets = load_comet_catalog(&source).await.unwrap();
        assert_eq!(comets.len(), 1);
        assert_eq!(comets[0].name(), "1P/Halley");
    }

    #[tokio::test]
    async fn test_download_failure_without_cache_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = CatalogSource::Download {
            url:      "http://127.0.0.1:9/CometEls.txt".to_string(),
            data_dir: dir.path().join("missing"),
        };
        assert!(load_comet_catalog(&source).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_local_catalog_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "\n\n").unwrap();
        assert!(load_comet_catalog(&CatalogSource::Local(path)).await.is_err());
    }
}
