#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::Semaphore;

use meow_playground::error::LoadError;
use meow_playground::loader::{Bootstrap, EntryPoint, ModuleArtifact, ModuleFetcher, ModuleLoader};

/// Fetcher that counts calls, can be held open, and can fail a number of times.
#[derive(Default)]
pub struct FakeFetcher {
    pub fetches: AtomicUsize,
    failures_left: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl FakeFetcher {
    pub fn failing(times: usize) -> Self {
        Self { failures_left: AtomicUsize::new(times), ..Self::default() }
    }

    /// Every fetch waits for one permit on the returned semaphore.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        Self::gated_failing(0)
    }

    pub fn gated_failing(times: usize) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let fetcher = Self { failures_left: AtomicUsize::new(times), gate: Some(gate.clone()), ..Self::default() };
        (fetcher, gate)
    }

    pub fn count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ModuleFetcher for FakeFetcher {
    fn fetch(&self) -> BoxFuture<'static, Result<ModuleArtifact, LoadError>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let gate = self.gate.clone();
        async move {
            if let Some(gate) = gate {
                gate.acquire().await.expect("gate closed").forget();
            }
            if fail {
                Err(LoadError::Fetch { origin: "fake://meow".into(), details: "connection refused".into() })
            } else {
                Ok(ModuleArtifact::Local(PathBuf::from("/fake/meow")))
            }
        }
        .boxed()
    }
}

pub struct FakeBootstrap {
    pub instantiations: AtomicUsize,
    entry: Arc<dyn EntryPoint>,
}

impl FakeBootstrap {
    pub fn new(entry: Arc<dyn EntryPoint>) -> Self {
        Self { instantiations: AtomicUsize::new(0), entry }
    }

    pub fn count(&self) -> usize {
        self.instantiations.load(Ordering::SeqCst)
    }
}

impl Bootstrap for FakeBootstrap {
    fn instantiate(&self, _artifact: ModuleArtifact) -> Result<Arc<dyn EntryPoint>, LoadError> {
        self.instantiations.fetch_add(1, Ordering::SeqCst);
        Ok(self.entry.clone())
    }
}

/// Entry point that answers every call with a fixed response.
pub struct ScriptedEntry {
    response: String,
    pub calls: AtomicUsize,
    pub sources: Mutex<Vec<String>>,
}

impl ScriptedEntry {
    pub fn new(response: impl Into<String>) -> Self {
        Self { response: response.into(), calls: AtomicUsize::new(0), sources: Mutex::new(Vec::new()) }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::new(value.to_string())
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EntryPoint for ScriptedEntry {
    fn run_meow(&self, source: &str) -> BoxFuture<'static, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sources.lock().unwrap().push(source.to_string());
        let response = self.response.clone();
        async move { response }.boxed()
    }
}

pub struct PanickingEntry;

impl EntryPoint for PanickingEntry {
    fn run_meow(&self, _source: &str) -> BoxFuture<'static, String> {
        panic!("engine blew up");
    }
}

pub fn loader(fetcher: Arc<FakeFetcher>, bootstrap: Arc<FakeBootstrap>) -> Arc<ModuleLoader> {
    Arc::new(ModuleLoader::new(fetcher, Some(bootstrap as Arc<dyn Bootstrap>)))
}
