//=========================================================================
// Asset Provider
//=========================================================================
//
// Async, de-duplicating, handle-tracking cache over an AssetLoader.
//
// Architecture:
//   load(address)
//     ├─ completed[address]  → cached result, no new request
//     ├─ pending[address]    → join the in-flight request
//     └─ loader.load_async() → track handle, publish as pending
//
//   release(address) → every outstanding handle for address, then drop them
//   clean_up()       → every outstanding handle, then forget everything
//
// The bookkeeping lives behind one short-held mutex that is never held
// across an await.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::Arc;

use futures::future::Shared;
use futures::FutureExt;
use log::{debug, trace};
use parking_lot::Mutex;

//=== Internal Dependencies ===============================================

use super::loader::{Asset, AssetLoader, HandleId, LoadFuture};
use crate::core::error::AssetError;

//=== Bookkeeping =========================================================

struct CompletedLoad {
    handle: HandleId,
    asset: Asset,
}

struct PendingLoad {
    handle: HandleId,
    completion: Shared<LoadFuture>,
}

#[derive(Default)]
struct CacheState {
    completed: HashMap<String, CompletedLoad>,
    // Outstanding handles only. Released ones are dropped.
    handles: HashMap<String, Vec<HandleId>>,
    pending: HashMap<String, PendingLoad>,
}

//=== AssetProvider =======================================================

/// Reference-tracking asset cache keyed by address.
///
/// After the first completed load of an address, further loads return the
/// cached asset without issuing a request. Concurrent first-time loads of
/// one address share a single request.
pub struct AssetProvider {
    loader: Arc<dyn AssetLoader>,
    state: Mutex<CacheState>,
}

impl AssetProvider {
    //--- Construction -----------------------------------------------------

    /// Wraps `loader` and runs its one-time initialization.
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        loader.initialize();
        Self {
            loader,
            state: Mutex::new(CacheState::default()),
        }
    }

    //--- Loading ----------------------------------------------------------

    /// Loads the asset at `address` as a `T`.
    pub async fn load<T: Any + Send + Sync>(&self, address: &str) -> Result<Arc<T>, AssetError> {
        let asset = self.load_untyped(address).await?;
        asset.downcast::<T>().map_err(|_| AssetError::TypeMismatch {
            address: address.to_owned(),
            expected: type_name::<T>(),
        })
    }

    /// Loads the asset at `address` without a type check.
    pub async fn load_untyped(&self, address: &str) -> Result<Asset, AssetError> {
        let (handle, completion) = {
            let mut state = self.state.lock();

            if let Some(done) = state.completed.get(address) {
                trace!("Asset cache hit for {}", address);
                return Ok(done.asset.clone());
            }

            match state.pending.get(address) {
                Some(pending) => {
                    trace!("Joining in-flight load of {}", address);
                    (pending.handle, pending.completion.clone())
                }
                None => {
                    let request = self.loader.load_async(address);
                    let completion = request.completion.shared();
                    debug!("Issued load {:?} for {}", request.handle, address);

                    state
                        .handles
                        .entry(address.to_owned())
                        .or_default()
                        .push(request.handle);
                    state.pending.insert(
                        address.to_owned(),
                        PendingLoad {
                            handle: request.handle,
                            completion: completion.clone(),
                        },
                    );
                    (request.handle, completion)
                }
            }
        };

        let result = completion.await;
        self.settle(address, handle, &result);
        result
    }

    // Moves a finished request from pending to completed. Only the request
    // currently published for the address may do so, which keeps loads that
    // were released mid-flight out of the cache.
    fn settle(&self, address: &str, handle: HandleId, result: &Result<Asset, AssetError>) {
        let mut state = self.state.lock();
        let owns_slot = state
            .pending
            .get(address)
            .is_some_and(|pending| pending.handle == handle);
        if !owns_slot {
            return;
        }

        state.pending.remove(address);
        if let Ok(asset) = result {
            state.completed.insert(
                address.to_owned(),
                CompletedLoad {
                    handle,
                    asset: asset.clone(),
                },
            );
        }
    }

    //--- Release ----------------------------------------------------------

    /// Releases every outstanding handle issued for `address`.
    ///
    /// The cached result is evicted so the next load issues a fresh request.
    /// Releasing an address with nothing outstanding is a no-op.
    pub fn release(&self, address: &str) {
        let mut state = self.state.lock();
        state.pending.remove(address);
        if let Some(done) = state.completed.remove(address) {
            trace!("Evicted {:?} for {}", done.handle, address);
        }

        let Some(handles) = state.handles.get_mut(address) else {
            debug!("Release of untracked address {} ignored", address);
            return;
        };

        let released = std::mem::take(handles);
        for handle in &released {
            self.loader.release(*handle);
        }
        debug!("Released {} handle(s) for {}", released.len(), address);
    }

    /// Releases every tracked handle and clears all bookkeeping.
    pub fn clean_up(&self) {
        let mut state = self.state.lock();
        let mut released = 0;
        for handle in state.handles.values().flatten() {
            self.loader.release(*handle);
            released += 1;
        }

        state.completed.clear();
        state.pending.clear();
        state.handles.clear();
        debug!("Asset cache cleaned up ({} handle(s) released)", released);
    }

    //--- Query API --------------------------------------------------------

    /// Returns true if a completed load for `address` is cached.
    pub fn is_cached(&self, address: &str) -> bool {
        self.state.lock().completed.contains_key(address)
    }

    /// Returns true if a request for `address` is still in flight.
    pub fn is_pending(&self, address: &str) -> bool {
        self.state.lock().pending.contains_key(address)
    }

    /// Number of handles for `address` not yet released.
    pub fn live_handles(&self, address: &str) -> usize {
        self.state
            .lock()
            .handles
            .get(address)
            .map_or(0, Vec::len)
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assets::loader::{LoadRequest, MemoryAssetLoader};
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn provider_with(loader: &Arc<MemoryAssetLoader>) -> AssetProvider {
        AssetProvider::new(loader.clone())
    }

    // Loader whose requests stay pending until `open` is notified.
    struct GatedLoader {
        gate: Arc<Notify>,
        requests: AtomicUsize,
        next: AtomicU64,
    }

    impl AssetLoader for GatedLoader {
        fn load_async(&self, _address: &str) -> LoadRequest {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let gate = self.gate.clone();
            LoadRequest {
                handle: HandleId(self.next.fetch_add(1, Ordering::SeqCst)),
                completion: async move {
                    gate.notified().await;
                    Ok(Arc::new(7u32) as Asset)
                }
                .boxed(),
            }
        }

        fn release(&self, _handle: HandleId) {}
    }

    //--- Construction -----------------------------------------------------

    #[test]
    fn construction_initializes_loader_once() {
        let loader = Arc::new(MemoryAssetLoader::new());
        let _provider = provider_with(&loader);
        assert_eq!(loader.initialize_count(), 1);
    }

    //--- Loading ----------------------------------------------------------

    #[tokio::test]
    async fn completed_loads_are_served_from_cache() {
        let loader = Arc::new(MemoryAssetLoader::new().with("Hud.prefab", 5u32));
        let provider = provider_with(&loader);

        let first = provider.load::<u32>("Hud.prefab").await.unwrap();
        let second = provider.load::<u32>("Hud.prefab").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.request_count("Hud.prefab"), 1);
        assert!(provider.is_cached("Hud.prefab"));
    }

    #[tokio::test]
    async fn concurrent_first_loads_share_one_request() {
        let gate = Arc::new(Notify::new());
        let loader = Arc::new(GatedLoader {
            gate: gate.clone(),
            requests: AtomicUsize::new(0),
            next: AtomicU64::new(0),
        });
        let provider = AssetProvider::new(loader.clone());

        let both = futures::future::join(
            provider.load::<u32>("Shop.prefab"),
            provider.load::<u32>("Shop.prefab"),
        );
        let opener = async {
            tokio::task::yield_now().await;
            assert!(provider.is_pending("Shop.prefab"));
            gate.notify_waiters();
        };
        let ((a, b), ()) = futures::future::join(both, opener).await;

        assert_eq!(*a.unwrap(), 7);
        assert_eq!(*b.unwrap(), 7);
        assert_eq!(loader.requests.load(Ordering::SeqCst), 1);
        assert!(provider.is_cached("Shop.prefab"));
        assert_eq!(provider.live_handles("Shop.prefab"), 1);
    }

    #[tokio::test]
    async fn wrong_type_is_reported() {
        let loader = Arc::new(MemoryAssetLoader::new().with("Hud.prefab", 5u32));
        let provider = provider_with(&loader);

        let err = provider.load::<String>("Hud.prefab").await.unwrap_err();

        assert!(matches!(err, AssetError::TypeMismatch { .. }));
    }

    #[tokio::test]
    async fn failed_loads_are_not_cached() {
        let loader = Arc::new(MemoryAssetLoader::new());
        let provider = provider_with(&loader);

        assert!(provider.load::<u32>("Missing.prefab").await.is_err());
        assert!(!provider.is_cached("Missing.prefab"));

        loader.insert("Missing.prefab", 1u32);
        assert_eq!(*provider.load::<u32>("Missing.prefab").await.unwrap(), 1);
        assert_eq!(loader.request_count("Missing.prefab"), 2);
    }

    //--- Release ----------------------------------------------------------

    #[test]
    fn release_of_unknown_address_is_noop() {
        let loader = Arc::new(MemoryAssetLoader::new());
        let provider = provider_with(&loader);

        provider.release("Nothing.prefab");

        assert_eq!(loader.release_count("Nothing.prefab"), 0);
        assert_eq!(provider.live_handles("Nothing.prefab"), 0);
    }

    #[tokio::test]
    async fn release_returns_each_handle_exactly_once() {
        let loader = Arc::new(MemoryAssetLoader::new().with("Popup.prefab", 1u32));
        let provider = provider_with(&loader);
        provider.load::<u32>("Popup.prefab").await.unwrap();

        provider.release("Popup.prefab");
        provider.release("Popup.prefab");

        assert_eq!(loader.release_count("Popup.prefab"), 1);
        assert_eq!(provider.live_handles("Popup.prefab"), 0);
        assert!(!provider.is_cached("Popup.prefab"));
    }

    #[tokio::test]
    async fn load_after_release_issues_fresh_request() {
        let loader = Arc::new(MemoryAssetLoader::new().with("Popup.prefab", 1u32));
        let provider = provider_with(&loader);

        provider.load::<u32>("Popup.prefab").await.unwrap();
        provider.release("Popup.prefab");
        provider.load::<u32>("Popup.prefab").await.unwrap();

        assert_eq!(loader.request_count("Popup.prefab"), 2);
        assert_eq!(provider.live_handles("Popup.prefab"), 1);
    }

    #[tokio::test]
    async fn repeated_load_release_cycles_keep_bookkeeping_bounded() {
        let loader = Arc::new(MemoryAssetLoader::new().with("Popup.prefab", 1u32));
        let provider = provider_with(&loader);

        for _ in 0..1000 {
            provider.load::<u32>("Popup.prefab").await.unwrap();
            provider.release("Popup.prefab");
        }

        assert_eq!(provider.state.lock().handles["Popup.prefab"].len(), 0);
        assert_eq!(loader.release_count("Popup.prefab"), 1000);

        provider.release("Popup.prefab");
        assert_eq!(loader.release_count("Popup.prefab"), 1000);
    }

    #[tokio::test]
    async fn clean_up_releases_everything() {
        let loader = Arc::new(MemoryAssetLoader::new().with("A", 1u32).with("B", 2u32));
        let provider = provider_with(&loader);
        provider.load::<u32>("A").await.unwrap();
        provider.load::<u32>("B").await.unwrap();
        provider.release("A");

        provider.clean_up();

        assert_eq!(loader.release_count("A"), 1);
        assert_eq!(loader.release_count("B"), 1);
        assert!(!provider.is_cached("B"));
        assert_eq!(provider.live_handles("B"), 0);
    }
}
