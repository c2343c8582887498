use async_trait::async_trait;
use scenekit_assets::{AssetCache, AssetError, AssetLoader, ResolvedAsset};
use scenekit_core::{AppEvent, AssetEvent, EventBus, EventCategory, EventFilter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Loader whose loads block until the test opens the gate.
struct GatedLoader {
    gate: Semaphore,
    fail: bool,
    loads: AtomicUsize,
    released: Mutex<Vec<String>>,
}

impl GatedLoader {
    fn new() -> Arc<Self> {
        Self::build(false)
    }

    fn failing() -> Arc<Self> {
        Self::build(true)
    }

    fn build(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            fail,
            loads: AtomicUsize::new(0),
            released: Mutex::new(Vec::new()),
        })
    }

    fn open(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }

    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn released(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetLoader for GatedLoader {
    async fn load(&self, key: &str) -> Result<ResolvedAsset, AssetError> {
        let n = self.loads.fetch_add(1, Ordering::SeqCst);
        let _permit = self.gate.acquire().await.map_err(|_| AssetError::LoadAborted {
            key: key.to_string(),
        })?;
        if self.fail {
            return Err(AssetError::LoadFailed {
                key: key.to_string(),
                reason: "decode error".to_string(),
            });
        }
        Ok(ResolvedAsset {
            key: key.to_string(),
            url: format!("test:{}/{}", key, n),
        })
    }

    fn release(&self, asset: &ResolvedAsset) {
        self.released.lock().unwrap().push(asset.url.clone());
    }
}

#[tokio::test]
async fn test_concurrent_acquires_share_one_load() {
    let loader = GatedLoader::new();
    let cache = AssetCache::new(loader.clone());

    let open = async {
        tokio::task::yield_now().await;
        loader.open();
    };
    let (a, b, ()) = tokio::join!(cache.acquire("k"), cache.acquire("k"), open);

    let a = a.unwrap();
    assert_eq!(Ok(a.clone()), b);
    assert_eq!(loader.loads(), 1);
    assert_eq!(cache.ref_count("k"), Some(2));

    cache.release("k");
    assert_eq!(cache.ref_count("k"), Some(1));
    assert!(loader.released().is_empty());

    cache.release("k");
    assert_eq!(cache.ref_count("k"), None);
    assert_eq!(loader.released(), vec![a.url]);

    // Releasing again is a no-op.
    cache.release("k");
    assert_eq!(loader.released().len(), 1);
}

#[tokio::test]
async fn test_cached_entry_is_reused() {
    let loader = GatedLoader::new();
    loader.open();
    let cache = AssetCache::new(loader.clone());

    let first = cache.acquire("k").await.unwrap();
    let second = cache.acquire("k").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(loader.loads(), 1);
    assert_eq!(cache.ref_count("k"), Some(2));
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_failure_reaches_every_waiter_and_caches_nothing() {
    let loader = GatedLoader::failing();
    let cache = AssetCache::new(loader.clone());

    let open = async {
        tokio::task::yield_now().await;
        loader.open();
    };
    let (a, b, ()) = tokio::join!(cache.acquire("k"), cache.acquire("k"), open);

    let expected = Err(AssetError::LoadFailed {
        key: "k".to_string(),
        reason: "decode error".to_string(),
    });
    assert_eq!(a, expected);
    assert_eq!(b, expected);
    assert_eq!(loader.loads(), 1);
    assert!(!cache.contains("k"));
    assert!(!cache.is_loading("k"));

    // Nothing is remembered; the next acquire tries again.
    assert!(cache.acquire("k").await.is_err());
    assert_eq!(loader.loads(), 2);
}

#[tokio::test]
async fn test_release_to_zero_during_load_releases_after_completion() {
    let loader = GatedLoader::new();
    let cache = AssetCache::new(loader.clone());

    let release = async {
        tokio::task::yield_now().await;
        assert!(cache.is_loading("k"));
        cache.release("k");
        cache.release("k");
        loader.open();
    };
    let (a, b, ()) = tokio::join!(cache.acquire("k"), cache.acquire("k"), release);

    let aborted = Err(AssetError::LoadAborted {
        key: "k".to_string(),
    });
    assert_eq!(a, aborted);
    assert_eq!(b, aborted);
    assert_eq!(loader.loads(), 1);
    assert_eq!(loader.released().len(), 1);
    assert!(!cache.contains("k"));
}

#[tokio::test]
async fn test_remove_during_load() {
    let loader = GatedLoader::new();
    let cache = AssetCache::new(loader.clone());

    let remove = async {
        tokio::task::yield_now().await;
        assert!(cache.remove("k"));
        loader.open();
    };
    let (a, b, ()) = tokio::join!(cache.acquire("k"), cache.acquire("k"), remove);

    let removed = Err(AssetError::Removed {
        key: "k".to_string(),
    });
    assert_eq!(a, removed);
    assert_eq!(b, removed);
    // The orphaned load's resource is still released.
    assert_eq!(loader.released().len(), 1);
    assert!(!cache.contains("k"));
    assert!(!cache.is_loading("k"));
}

#[tokio::test]
async fn test_new_load_after_remove_is_independent() {
    let loader = GatedLoader::new();
    let cache = AssetCache::new(loader.clone());

    let stale = cache.clone();
    let first = tokio::spawn(async move { stale.acquire("k").await });
    while !cache.is_loading("k") {
        tokio::task::yield_now().await;
    }
    cache.remove("k");

    let fresh = cache.clone();
    let second = tokio::spawn(async move { fresh.acquire("k").await });
    loader.open();

    assert_eq!(
        first.await.unwrap(),
        Err(AssetError::Removed {
            key: "k".to_string()
        })
    );
    let asset = second.await.unwrap().unwrap();
    assert_eq!(cache.ref_count("k"), Some(1));
    assert_eq!(loader.loads(), 2);
    assert_eq!(loader.released().len(), 1);
    assert!(!loader.released().contains(&asset.url));
}

#[tokio::test]
async fn test_stale_waiter_leaves_newer_entry_alone() {
    let loader = GatedLoader::new();
    let cache = AssetCache::new(loader.clone());

    // A caller waits on the first load, which is then removed.
    let mut stale = Box::pin(cache.acquire("k"));
    assert!(tokio::time::timeout(Duration::from_millis(10), &mut stale)
        .await
        .is_err());
    assert!(cache.remove("k"));

    let fresh = cache.clone();
    let holder = tokio::spawn(async move { fresh.acquire("k").await });
    while !cache.is_loading("k") {
        tokio::task::yield_now().await;
    }
    loader.open();
    let asset = holder.await.unwrap().unwrap();
    assert_eq!(cache.ref_count("k"), Some(1));

    // Giving up on the removed load must not touch the new holder's reference.
    drop(stale);
    assert_eq!(cache.ref_count("k"), Some(1));
    assert!(!loader.released().contains(&asset.url));

    cache.release("k");
    assert_eq!(cache.ref_count("k"), None);
    assert!(loader.released().contains(&asset.url));
}

#[tokio::test]
async fn test_stale_waiter_leaves_newer_load_alone() {
    let loader = GatedLoader::new();
    let cache = AssetCache::new(loader.clone());

    let mut stale = Box::pin(cache.acquire("k"));
    assert!(tokio::time::timeout(Duration::from_millis(10), &mut stale)
        .await
        .is_err());
    assert!(cache.remove("k"));

    // A second load is in flight with one waiter when the stale one gives up.
    let fresh = cache.clone();
    let holder = tokio::spawn(async move { fresh.acquire("k").await });
    while !cache.is_loading("k") {
        tokio::task::yield_now().await;
    }
    drop(stale);

    loader.open();
    assert!(holder.await.unwrap().is_ok());
    assert_eq!(cache.ref_count("k"), Some(1));
}

#[tokio::test]
async fn test_remove_cached_entry_ignores_refcount() {
    let loader = GatedLoader::new();
    loader.open();
    let cache = AssetCache::new(loader.clone());

    cache.acquire("k").await.unwrap();
    cache.acquire("k").await.unwrap();
    assert!(cache.remove("k"));
    assert_eq!(loader.released().len(), 1);

    // Outstanding holders releasing later change nothing.
    cache.release("k");
    cache.release("k");
    assert_eq!(loader.released().len(), 1);

    assert!(!cache.remove("k"));
    assert!(!cache.remove("unknown"));
}

#[tokio::test]
async fn test_abandoned_acquire_gives_reference_back() {
    let loader = GatedLoader::new();
    let cache = AssetCache::new(loader.clone());

    let timed_out = tokio::time::timeout(Duration::from_millis(10), cache.acquire("k")).await;
    assert!(timed_out.is_err());

    loader.open();
    while cache.is_loading("k") {
        tokio::task::yield_now().await;
    }
    assert!(!cache.contains("k"));
    assert_eq!(loader.released().len(), 1);
}

#[tokio::test]
async fn test_lifecycle_events() {
    let bus = Arc::new(EventBus::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    bus.subscribe(EventFilter::Categories(vec![EventCategory::Asset]), move |e| {
        sink.lock().unwrap().push(e);
    });

    let loader = GatedLoader::new();
    loader.open();
    let cache = AssetCache::with_event_bus(loader, bus);
    cache.acquire("k").await.unwrap();
    cache.release("k");
    cache.acquire("k").await.unwrap();
    cache.remove("k");

    let key = || "k".to_string();
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[
            AppEvent::Asset(AssetEvent::Loaded { key: key() }),
            AppEvent::Asset(AssetEvent::Released { key: key() }),
            AppEvent::Asset(AssetEvent::Loaded { key: key() }),
            AppEvent::Asset(AssetEvent::Removed { key: key() }),
        ]
    );
}
