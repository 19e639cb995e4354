//=========================================================================
// Asset Management
//=========================================================================
//
// Addressed asset loading for view prefabs.
//
// Architecture:
//   AssetProvider (cache + handle bookkeeping)
//     └─ Arc<dyn AssetLoader> (engine asset-addressing system)
//
//=========================================================================

//=== Module Declarations =================================================

mod asset_provider;
mod loader;

//=== Public API ==========================================================

pub use asset_provider::AssetProvider;
pub use loader::{Asset, AssetLoader, HandleId, LoadFuture, LoadRequest, MemoryAssetLoader};
