//! Offline copy of the dashboard shell.
//!
//! A fixed manifest of static assets is downloaded on install. Later fetches
//! go to the network first and fall back to the stored copy only when the
//! request cannot be sent at all. Weather API responses are never stored.

use reqwest::Client;
use std::path::{Path, PathBuf};

use crate::DashError;

pub const CACHE_NAME: &str = "wd-static-v1";

pub const ASSET_MANIFEST: &[&str] = &["/", "/index.html", "/styles.css", "/app.js", "/config.js"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSource {
    Network,
    Cache,
}

#[derive(Debug, Clone)]
pub struct AssetResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub source: AssetSource,
}

#[derive(Debug, Clone)]
pub struct AssetCache {
    http: Client,
    origin: String,
    dir: PathBuf,
}

impl AssetCache {
    /// `root` is the cache base directory; entries live in a subdirectory
    /// named after [`CACHE_NAME`].
    pub fn new(origin: &str, root: &Path) -> Self {
        Self {
            http: Client::new(),
            origin: origin.trim_end_matches('/').to_string(),
            dir: root.join(CACHE_NAME),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Download every manifest asset and store them. Nothing is written
    /// unless all downloads succeed.
    pub async fn install(&self) -> Result<usize, DashError> {
        let mut fetched = Vec::with_capacity(ASSET_MANIFEST.len());

        for path in ASSET_MANIFEST {
            let res = self.http.get(self.url(path)).send().await?;
            let status = res.status();
            if !status.is_success() {
                return Err(DashError::Http {
                    service: "asset",
                    status: status.as_u16(),
                    body: (*path).to_string(),
                });
            }
            fetched.push((*path, res.bytes().await?));
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        for (path, body) in &fetched {
            tokio::fs::write(self.entry_path(path), body).await?;
        }

        tracing::info!(count = fetched.len(), dir = %self.dir.display(), "asset cache installed");
        Ok(fetched.len())
    }

    /// Network first; a stored copy answers only when the request fails to
    /// go through.
    pub async fn fetch(&self, path: &str) -> Result<AssetResponse, DashError> {
        match self.fetch_network(path).await {
            Ok(response) => Ok(response),
            Err(network_err) => match self.cached(path).await {
                Some(body) => {
                    tracing::debug!(path, error = %network_err, "serving asset from cache");
                    Ok(AssetResponse {
                        status: 200,
                        body,
                        source: AssetSource::Cache,
                    })
                }
                None => Err(network_err.into()),
            },
        }
    }

    pub async fn cached(&self, path: &str) -> Option<Vec<u8>> {
        tokio::fs::read(self.entry_path(path)).await.ok()
    }

    async fn fetch_network(&self, path: &str) -> Result<AssetResponse, reqwest::Error> {
        let res = self.http.get(self.url(path)).send().await?;
        let status = res.status().as_u16();
        let body = res.bytes().await?.to_vec();

        Ok(AssetResponse {
            status,
            body,
            source: AssetSource::Network,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    fn entry_path(&self, path: &str) -> PathBuf {
        self.dir.join(urlencoding::encode(path).into_owned())
    }
}
