//=========================================================================
// Prefab Templates
//=========================================================================
//
// Immutable node templates that loaders serve at `<view id>.prefab` and
// the scene graph copies on instantiation.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::mvcs::ViewDescriptor;

//=== Templates ===========================================================

/// Canvas component template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanvasTemplate {
    pub sorting_order: i32,
}

/// One node of a prefab hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrefabNode {
    pub name: String,
    pub canvases: Vec<CanvasTemplate>,
    pub raycasters: usize,
    pub children: Vec<PrefabNode>,
}

impl PrefabNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_canvas(mut self, canvas: CanvasTemplate) -> Self {
        self.canvases.push(canvas);
        self
    }

    pub fn with_raycasters(mut self, count: usize) -> Self {
        self.raycasters += count;
        self
    }

    pub fn with_child(mut self, child: PrefabNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A loadable view template.
///
/// `view` is the view component on the root node. A prefab without one
/// cannot be assembled into a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefab {
    pub root: PrefabNode,
    pub view: Option<ViewDescriptor>,
}

impl Prefab {
    /// Creates a prefab with no view component.
    pub fn new(root: PrefabNode) -> Self {
        Self { root, view: None }
    }

    /// Creates a prefab whose root carries `view`.
    pub fn view(root: PrefabNode, view: ViewDescriptor) -> Self {
        Self {
            root,
            view: Some(view),
        }
    }
}
