//=========================================================================
// Asset Loader
//=========================================================================
//
// Contract for the engine's asset-addressing system.
//
// The loader hands out one handle per request. Every handle it issues is
// tracked by the AssetProvider and released back through `release()`
// exactly once.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;

//=== Internal Dependencies ===============================================

use crate::core::error::AssetError;

//=== Public Types ========================================================

/// Type-erased loaded resource.
pub type Asset = Arc<dyn Any + Send + Sync>;

/// Completion of one load request.
pub type LoadFuture = BoxFuture<'static, Result<Asset, AssetError>>;

/// Identifies one load operation issued by a loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

/// An issued load: the handle to release later and its pending completion.
pub struct LoadRequest {
    pub handle: HandleId,
    pub completion: LoadFuture,
}

//=== AssetLoader Trait ===================================================

/// Async key → resource loader provided by the engine.
pub trait AssetLoader: Send + Sync + 'static {
    /// Called once when the owning cache is constructed.
    fn initialize(&self) {}

    /// Starts loading `address`.
    ///
    /// Failures are reported by resolving `completion` with an error.
    fn load_async(&self, address: &str) -> LoadRequest;

    /// Returns a previously issued handle to the loader.
    fn release(&self, handle: HandleId);
}

//=== MemoryAssetLoader ===================================================

/// In-memory loader backed by a map of address → asset.
///
/// Useful for tools, headless runs and tests. Keeps per-address counters of
/// issued requests and released handles.
#[derive(Default)]
pub struct MemoryAssetLoader {
    assets: Mutex<HashMap<String, Asset>>,
    stats: Mutex<HashMap<String, LoadStats>>,
    owners: Mutex<HashMap<HandleId, String>>,
    next_handle: AtomicU64,
    initialized: AtomicU64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct LoadStats {
    requests: usize,
    releases: usize,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the asset served at `address`.
    pub fn insert<T: Any + Send + Sync>(&self, address: impl Into<String>, asset: T) {
        self.assets.lock().insert(address.into(), Arc::new(asset));
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with<T: Any + Send + Sync>(self, address: impl Into<String>, asset: T) -> Self {
        self.insert(address, asset);
        self
    }

    /// Number of load requests issued for `address`.
    pub fn request_count(&self, address: &str) -> usize {
        self.stats.lock().get(address).map_or(0, |s| s.requests)
    }

    /// Number of handles released for `address`.
    pub fn release_count(&self, address: &str) -> usize {
        self.stats.lock().get(address).map_or(0, |s| s.releases)
    }

    /// How many times `initialize` ran.
    pub fn initialize_count(&self) -> u64 {
        self.initialized.load(Ordering::Relaxed)
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn initialize(&self) {
        self.initialized.fetch_add(1, Ordering::Relaxed);
    }

    fn load_async(&self, address: &str) -> LoadRequest {
        let handle = HandleId(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.stats.lock().entry(address.to_owned()).or_default().requests += 1;
        self.owners.lock().insert(handle, address.to_owned());

        let result = self
            .assets
            .lock()
            .get(address)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(address.to_owned()));

        LoadRequest {
            handle,
            completion: async move { result }.boxed(),
        }
    }

    fn release(&self, handle: HandleId) {
        if let Some(address) = self.owners.lock().remove(&handle) {
            self.stats.lock().entry(address).or_default().releases += 1;
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
