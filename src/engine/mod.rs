//! Engine adapters: where the execution module comes from and how it runs.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::Config;
use crate::loader::{Bootstrap, ModuleFetcher, ModuleLoader};

pub mod process;
pub mod source;

pub use process::{ProcessBootstrap, ProcessEntryPoint};
pub use source::{FileFetcher, HttpFetcher};

/// Where the engine module is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSource {
    Http(String),
    File(PathBuf),
}

impl ModuleSource {
    /// URLs become HTTP sources; bare program names are looked up on `PATH`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Self::Http(value.to_string());
        }
        let path = Path::new(value);
        if path.components().count() == 1 {
            if let Some(found) = find_on_path(value) {
                return Self::File(found);
            }
        }
        Self::File(path.to_path_buf())
    }

    pub fn fetcher(&self, timeout: Duration) -> Result<Arc<dyn ModuleFetcher>> {
        Ok(match self {
            Self::Http(url) => Arc::new(HttpFetcher::new(url, timeout)?),
            Self::File(path) => Arc::new(FileFetcher::new(path)),
        })
    }
}

fn find_on_path(program: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Build the loader described by the configuration.
pub fn loader_from_config(cfg: &Config) -> Result<ModuleLoader> {
    let source = ModuleSource::parse(&cfg.module());
    let fetcher = source.fetcher(cfg.request_timeout())?;
    let bootstrap: Arc<dyn Bootstrap> =
        Arc::new(ProcessBootstrap::new(cfg.engine_cache_path(), cfg.engine_args()));
    Ok(ModuleLoader::new(fetcher, Some(bootstrap)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urls() {
        assert_eq!(
            ModuleSource::parse("https://example.invalid/meow"),
            ModuleSource::Http("https://example.invalid/meow".into())
        );
        assert_eq!(
            ModuleSource::parse(" HTTP://example.invalid/meow "),
            ModuleSource::Http("HTTP://example.invalid/meow".into())
        );
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(
            ModuleSource::parse("/opt/meow/bin/meow"),
            ModuleSource::File(PathBuf::from("/opt/meow/bin/meow"))
        );
        assert_eq!(
            ModuleSource::parse("./bin/meow"),
            ModuleSource::File(PathBuf::from("./bin/meow"))
        );
    }

    #[test]
    fn test_parse_unknown_program_stays_relative() {
        assert_eq!(
            ModuleSource::parse("definitely-not-a-meow-engine-binary"),
            ModuleSource::File(PathBuf::from("definitely-not-a-meow-engine-binary"))
        );
    }
}
