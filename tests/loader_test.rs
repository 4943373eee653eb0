mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;

use common::{loader, FakeBootstrap, FakeFetcher, ScriptedEntry};
use meow_playground::error::LoadError;
use meow_playground::loader::{LoadState, ModuleLoader};

fn echo_bootstrap() -> Arc<FakeBootstrap> {
    Arc::new(FakeBootstrap::new(Arc::new(ScriptedEntry::json(json!({ "output": "ok" })))))
}

#[tokio::test]
async fn concurrent_callers_share_one_attempt() -> Result<()> {
    let (fetcher, gate) = FakeFetcher::gated();
    let fetcher = Arc::new(fetcher);
    let bootstrap = echo_bootstrap();
    let loader = loader(fetcher.clone(), bootstrap.clone());

    let mut waiters = Vec::new();
    for _ in 0..5 {
        let loader = loader.clone();
        waiters.push(tokio::spawn(async move { loader.ensure_ready().await }));
    }

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(loader.state(), LoadState::Loading);
    assert_eq!(fetcher.count(), 1);

    gate.add_permits(1);
    for waiter in waiters {
        assert!(waiter.await?.is_ok());
    }

    assert_eq!(loader.state(), LoadState::Ready);
    assert_eq!(fetcher.count(), 1);
    assert_eq!(bootstrap.count(), 1);
    Ok(())
}

#[tokio::test]
async fn ready_loader_resolves_without_fetching() -> Result<()> {
    let fetcher = Arc::new(FakeFetcher::default());
    let bootstrap = echo_bootstrap();
    let loader = loader(fetcher.clone(), bootstrap.clone());

    loader.ensure_ready().await?;
    loader.ensure_ready().await?;
    loader.ensure_ready().await?;

    assert_eq!(fetcher.count(), 1);
    assert_eq!(bootstrap.count(), 1);
    Ok(())
}

#[tokio::test]
async fn failed_attempt_is_retried_on_next_call() -> Result<()> {
    let fetcher = Arc::new(FakeFetcher::failing(1));
    let bootstrap = echo_bootstrap();
    let loader = loader(fetcher.clone(), bootstrap.clone());

    let err = loader.ensure_ready().await.err().unwrap();
    assert!(matches!(err, LoadError::Fetch { .. }));
    assert_eq!(loader.state(), LoadState::Failed);
    assert!(loader.entry_point().is_none());
    assert_eq!(bootstrap.count(), 0);

    loader.ensure_ready().await?;
    assert_eq!(loader.state(), LoadState::Ready);
    assert_eq!(loader.last_error(), None);
    assert_eq!(fetcher.count(), 2);
    Ok(())
}

#[tokio::test]
async fn waiters_of_a_failed_attempt_all_see_the_error() -> Result<()> {
    let (fetcher, gate) = FakeFetcher::gated_failing(1);
    let fetcher = Arc::new(fetcher);
    let loader = loader(fetcher.clone(), echo_bootstrap());

    let a = tokio::spawn({
        let loader = loader.clone();
        async move { loader.ensure_ready().await.map(|_| ()) }
    });
    let b = tokio::spawn({
        let loader = loader.clone();
        async move { loader.ensure_ready().await.map(|_| ()) }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    gate.add_permits(1);

    assert!(matches!(a.await?, Err(LoadError::Fetch { .. })));
    assert!(matches!(b.await?, Err(LoadError::Fetch { .. })));
    assert_eq!(fetcher.count(), 1);
    assert_eq!(loader.state(), LoadState::Failed);
    Ok(())
}

#[tokio::test]
async fn missing_bootstrap_never_fetches() -> Result<()> {
    let fetcher = Arc::new(FakeFetcher::default());
    let loader = ModuleLoader::new(fetcher.clone(), None);

    assert_eq!(loader.ensure_ready().await.err(), Some(LoadError::MissingBootstrap));
    assert_eq!(loader.ensure_ready().await.err(), Some(LoadError::MissingBootstrap));
    assert_eq!(fetcher.count(), 0);
    assert_eq!(loader.state(), LoadState::Failed);
    Ok(())
}
