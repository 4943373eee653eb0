//! Module fetchers: local filesystem and HTTP.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use crate::error::LoadError;
use crate::loader::{ModuleArtifact, ModuleFetcher};

#[derive(Debug, Clone)]
pub struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }
}

impl ModuleFetcher for FileFetcher {
    fn fetch(&self) -> BoxFuture<'static, Result<ModuleArtifact, LoadError>> {
        let path = self.path.clone();
        async move {
            let meta = tokio::fs::metadata(&path).await.map_err(|e| LoadError::Fetch {
                origin: path.display().to_string(),
                details: e.to_string(),
            })?;
            if !meta.is_file() {
                return Err(LoadError::Fetch {
                    origin: path.display().to_string(),
                    details: "not a regular file".into(),
                });
            }
            debug!(path = %path.display(), size = meta.len(), "engine found on disk");
            Ok(ModuleArtifact::Local(path))
        }
        .boxed()
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
    url: String,
}

impl HttpFetcher {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url: url.to_string() })
    }
}

impl ModuleFetcher for HttpFetcher {
    fn fetch(&self) -> BoxFuture<'static, Result<ModuleArtifact, LoadError>> {
        let http = self.http.clone();
        let url = self.url.clone();
        async move {
            let fetch_err = |details: String| LoadError::Fetch { origin: url.clone(), details };

            let resp = http.get(&url).send().await.map_err(|e| fetch_err(e.to_string()))?;
            if !resp.status().is_success() {
                return Err(fetch_err(format!("HTTP {}", resp.status())));
            }
            let bytes = resp.bytes().await.map_err(|e| fetch_err(e.to_string()))?;
            debug!(url = %url, size = bytes.len(), "engine downloaded");
            Ok(ModuleArtifact::Downloaded { origin: url.clone(), bytes: bytes.to_vec() })
        }
        .boxed()
    }
}
