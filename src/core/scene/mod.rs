//=========================================================================
// Scene System
//=========================================================================
//
// Host scene that instantiated views live in.
//
// Architecture:
//   SceneGraph
//     ├─ nodes: HashMap<NodeId, Node>
//     │    └─ canvases, raycasters, active flag
//     └─ instantiate(Prefab, parent) → NodeId
//
// The director owns one view root node and one camera. Every view is
// instantiated under that root and renders through that camera.
//
//=========================================================================

//=== Module Declarations =================================================

mod prefab;
mod scene_graph;

//=== Public API ==========================================================

pub use prefab::{CanvasTemplate, Prefab, PrefabNode};
pub use scene_graph::{
    CameraId, Canvas, NodeId, Raycaster, RenderMode, SceneGraph, SharedScene,
};
