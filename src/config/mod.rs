use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    time::Duration,
};

use directories::BaseDirs;

use crate::bridge::ReadinessPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    overrides: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&default_config_path())
    }

    /// Defaults, then the rc file at `path`, then environment variables.
    pub fn load_from(path: &Path) -> Self {
        let mut map = default_map();

        if path.exists() {
            if let Ok(file) = fs::File::open(path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    if let Some((k, v)) = parse_line(&line) {
                        map.insert(k, v);
                    }
                }
            }
        }

        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, overrides: HashMap::new(), config_path: path.to_path_buf() }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(v) = self.overrides.get(key) {
            return Some(v.clone());
        }
        // ENV next
        if let Ok(v) = env::var(key) {
            return Some(v);
        }
        self.inner.get(key).cloned()
    }

    /// Override a key for this process only (CLI flags beat env and rc file).
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.overrides.insert(key.to_string(), value.into());
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }

    pub fn module(&self) -> String {
        self.get("MEOW_MODULE").unwrap_or_else(|| "meow".into())
    }

    pub fn engine_args(&self) -> Vec<String> {
        self.get("MEOW_ENGINE_ARGS")
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    pub fn engine_cache_path(&self) -> PathBuf {
        self.get_path("MEOW_ENGINE_CACHE_PATH")
            .unwrap_or_else(|| env::temp_dir().join("meow_playground").join("engine"))
    }

    pub fn consent_path(&self) -> PathBuf {
        self.get_path("MEOW_CONSENT_PATH")
            .unwrap_or_else(|| app_config_dir().join("consent"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.get_path("MEOW_LOG_PATH")
            .unwrap_or_else(|| env::temp_dir().join("meow_playground").join("meowpg.log"))
    }

    pub fn log_filter(&self) -> String {
        self.get("MEOW_LOG").unwrap_or_else(|| "info".into())
    }

    pub fn playground_url(&self) -> String {
        self.get("MEOW_PLAYGROUND_URL").unwrap_or_default()
    }

    pub fn run_defer(&self) -> Duration {
        Duration::from_millis(self.get_u64("MEOW_RUN_DEFER_MS").unwrap_or(10))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.get_u64("REQUEST_TIMEOUT").unwrap_or(60))
    }

    pub fn readiness(&self) -> ReadinessPolicy {
        match self.get("MEOW_READINESS").as_deref().map(str::trim) {
            Some("require") => ReadinessPolicy::RequireReady,
            _ => ReadinessPolicy::EnsureReady,
        }
    }

    /// `DO_NOT_TRACK=1` (or `true`) suppresses the consent banner entirely.
    pub fn do_not_track(&self) -> bool {
        self.get_bool("DO_NOT_TRACK")
    }
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (k, v) = line.split_once('=')?;
    Some((k.trim().to_string(), v.trim().to_string()))
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &["REQUEST_TIMEOUT", "DO_NOT_TRACK"];

    KEYS.contains(&k) || k.starts_with("MEOW_")
}

fn app_config_dir() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("meow_playground")
}

fn default_config_path() -> PathBuf {
    app_config_dir().join(".meowrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    m.insert("MEOW_MODULE".into(), "meow".into());
    m.insert("MEOW_ENGINE_ARGS".into(), "run".into());
    m.insert("MEOW_RUN_DEFER_MS".into(), "10".into());
    m.insert("MEOW_READINESS".into(), "ensure".into());
    m.insert("MEOW_LOG".into(), "info".into());
    m.insert("REQUEST_TIMEOUT".into(), "60".into());
    m.insert("DO_NOT_TRACK".into(), "false".into());

    m
}
