//=========================================================================
// View Builder
//=========================================================================
//
// Assembles view instances from cached prefabs.
//
//   build(id, root)
//     ├─ AssetProvider::load::<Prefab>("<id>.prefab")
//     └─ SceneGraph::instantiate(prefab, root) → BuiltView
//
//   unload(id) → AssetProvider::release("<id>.prefab")
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::assets::AssetProvider;
use crate::core::error::DirectorError;
use crate::core::mvcs::ViewDescriptor;
use crate::core::scene::{NodeId, Prefab, SharedScene};

//=== BuiltView ===========================================================

/// A freshly instantiated view root and the view component it declared.
#[derive(Debug, Clone, Copy)]
pub struct BuiltView {
    pub node: NodeId,
    pub descriptor: Option<ViewDescriptor>,
}

//=== ViewBuilder =========================================================

pub struct ViewBuilder {
    assets: Arc<AssetProvider>,
    scene: SharedScene,
}

impl ViewBuilder {
    pub fn new(assets: Arc<AssetProvider>, scene: SharedScene) -> Self {
        Self { assets, scene }
    }

    /// Address of the prefab backing `view_id`.
    pub fn prefab_address(view_id: &str) -> String {
        format!("{view_id}.prefab")
    }

    /// Loads the prefab for `view_id` and instantiates it under `root`.
    pub async fn build(&self, view_id: &str, root: NodeId) -> Result<BuiltView, DirectorError> {
        let address = Self::prefab_address(view_id);
        let prefab = self
            .assets
            .load::<Prefab>(&address)
            .await
            .map_err(|source| DirectorError::PrefabLoad {
                view: view_id.to_owned(),
                source,
            })?;

        let node = self
            .scene
            .lock()
            .instantiate(&prefab, root)
            .ok_or_else(|| DirectorError::Instantiate(view_id.to_owned()))?;

        debug!("Instantiated {} as {:?}", address, node);
        Ok(BuiltView {
            node,
            descriptor: prefab.view,
        })
    }

    /// Releases the prefab for `view_id`.
    pub fn unload(&self, view_id: &str) {
        self.assets.release(&Self::prefab_address(view_id));
    }

    /// Releases every prefab the builder ever loaded.
    pub fn clean_up(&self) {
        self.assets.clean_up();
    }

    pub fn assets(&self) -> &Arc<AssetProvider> {
        &self.assets
    }
}

//=========================================================================
// Tests
//=========================================================================
