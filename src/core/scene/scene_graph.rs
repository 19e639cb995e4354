//=========================================================================
// Scene Graph
//=========================================================================
//
// Minimal retained node tree that hosts instantiated views.
//
// Nodes are stored in a HashMap by id and reference each other through
// parent/children ids. Sibling order is the order of a parent's children
// list, last sibling = front-most.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;
use parking_lot::Mutex;

//=== Internal Dependencies ===============================================

use super::prefab::{Prefab, PrefabNode};

//=== Identifiers =========================================================

/// Identifies a node in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Identifies the camera views render through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(pub u32);

//=== Components ==========================================================

/// How a canvas is composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    ScreenSpaceOverlay,
    ScreenSpaceCamera,
    WorldSpace,
}

/// A render surface attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Canvas {
    pub sorting_order: i32,
    pub sorting_layer: String,
    pub render_mode: RenderMode,
    pub camera: Option<CameraId>,
}

/// An input-blocking surface attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Raycaster {
    pub enabled: bool,
}

//=== Node ================================================================

#[derive(Debug)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    active: bool,
    canvases: Vec<Canvas>,
    raycasters: Vec<Raycaster>,
}

impl Node {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            active: true,
            canvases: Vec::new(),
            raycasters: Vec::new(),
        }
    }
}

/// Scene graph shared between the director, records and view handles.
pub type SharedScene = Arc<Mutex<SceneGraph>>;

//=== SceneGraph ==========================================================

/// Node tree with canvas and raycaster components.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
}

impl SceneGraph {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a new, empty graph for sharing.
    pub fn shared() -> SharedScene {
        Arc::new(Mutex::new(Self::new()))
    }

    //--- Structure --------------------------------------------------------

    /// Creates an empty node, appended as the last child of `parent`.
    ///
    /// Returns `None` if `parent` does not exist.
    pub fn create_node(&mut self, name: impl Into<String>, parent: Option<NodeId>) -> Option<NodeId> {
        if let Some(parent) = parent {
            if !self.nodes.contains_key(&parent) {
                return None;
            }
        }

        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(name.into(), parent));

        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.push(id);
        }
        Some(id)
    }

    /// Instantiates a copy of `prefab` under `parent`.
    ///
    /// Returns the root of the copy, or `None` if `parent` does not exist.
    pub fn instantiate(&mut self, prefab: &Prefab, parent: NodeId) -> Option<NodeId> {
        self.instantiate_node(&prefab.root, parent)
    }

    fn instantiate_node(&mut self, template: &PrefabNode, parent: NodeId) -> Option<NodeId> {
        let id = self.create_node(template.name.clone(), Some(parent))?;
        if let Some(node) = self.nodes.get_mut(&id) {
            node.canvases = template
                .canvases
                .iter()
                .map(|c| Canvas {
                    sorting_order: c.sorting_order,
                    ..Canvas::default()
                })
                .collect();
            node.raycasters = vec![Raycaster { enabled: true }; template.raycasters];
        }
        for child in &template.children {
            self.instantiate_node(child, id)?;
        }
        Some(id)
    }

    /// Destroys `node` and its whole subtree.
    ///
    /// Returns false if the node does not exist.
    pub fn destroy(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.nodes.get(&node).map(|n| n.parent) else {
            warn!("Attempted to destroy missing node {:?}", node);
            return false;
        };

        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&c| c != node);
        }
        for id in self.descendants(node) {
            self.nodes.remove(&id);
        }
        true
    }

    /// Moves `node` to the end of its parent's children (front-most).
    pub fn set_as_last_sibling(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(&node).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|&c| c != node);
            parent.children.push(node);
        }
    }

    //--- State ------------------------------------------------------------

    pub fn set_active(&mut self, node: NodeId, active: bool) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.active = active;
        }
    }

    pub fn is_active(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| n.active)
    }

    /// Applies `f` to every canvas in `node`'s subtree.
    pub fn for_each_canvas_mut(&mut self, node: NodeId, mut f: impl FnMut(&mut Canvas)) {
        for id in self.descendants(node) {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.canvases.iter_mut().for_each(&mut f);
            }
        }
    }

    /// Enables or disables every raycaster in `node`'s subtree.
    pub fn set_raycasters_enabled(&mut self, node: NodeId, enabled: bool) {
        for id in self.descendants(node) {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.raycasters.iter_mut().for_each(|r| r.enabled = enabled);
            }
        }
    }

    //--- Query API --------------------------------------------------------

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|n| n.name.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Position of `node` among its siblings.
    pub fn sibling_index(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&c| c == node)
    }

    /// Canvases in `node`'s subtree, in pre-order.
    pub fn canvases_in_children(&self, node: NodeId) -> Vec<Canvas> {
        self.descendants(node)
            .into_iter()
            .filter_map(|id| self.nodes.get(&id))
            .flat_map(|n| n.canvases.iter().cloned())
            .collect()
    }

    /// Raycasters in `node`'s subtree, in pre-order.
    pub fn raycasters_in_children(&self, node: NodeId) -> Vec<Raycaster> {
        self.descendants(node)
            .into_iter()
            .filter_map(|id| self.nodes.get(&id))
            .flat_map(|n| n.raycasters.iter().copied())
            .collect()
    }

    // Pre-order walk including `node` itself.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(n) = self.nodes.get(&id) else {
                continue;
            };
            out.push(id);
            stack.extend(n.children.iter().rev());
        }
        out
    }
}

//=========================================================================
// Tests
//=========================================================================
