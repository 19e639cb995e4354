//=========================================================================
// View
//=========================================================================
//
// View component data and the handle controllers use to drive an
// assembled view.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

//=== Internal Dependencies ===============================================

use crate::core::scene::{Canvas, NodeId, SharedScene};

//=== ViewKind ============================================================

/// Residency policy of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewKind {
    /// Preloaded once and kept resident.
    Static,

    /// Loaded on show and torn down on hide.
    #[default]
    Dynamic,
}

impl ViewKind {
    /// Base rendering order contributed by the kind.
    ///
    /// Dynamic views (popups, dialogs) sit above the resident layer.
    pub const fn base_order(self) -> i32 {
        match self {
            ViewKind::Static => 0,
            ViewKind::Dynamic => 1000,
        }
    }
}

//=== ViewDescriptor ======================================================

/// Declared properties of a view component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewDescriptor {
    pub kind: ViewKind,
    pub sorting_order: u16,
    pub priority: u8,
    pub modal: bool,
}

impl ViewDescriptor {
    pub fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn modal(mut self) -> Self {
        self.modal = true;
        self
    }

    pub fn with_sorting_order(mut self, sorting_order: u16) -> Self {
        self.sorting_order = sorting_order;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// `base(kind) + sorting_order + priority`.
    pub fn rendering_order(&self) -> i32 {
        self.kind.base_order() + i32::from(self.sorting_order) + i32::from(self.priority)
    }
}

//=== ViewHandle ==========================================================

/// Handle to an assembled view instance.
///
/// Cheap to clone. Every clone refers to the same scene node and shares one
/// cancellation token, cancelled when the view is disposed.
#[derive(Debug, Clone)]
pub struct ViewHandle {
    id: Arc<str>,
    node: NodeId,
    descriptor: ViewDescriptor,
    scene: SharedScene,
    cancellation: CancellationToken,
}

impl ViewHandle {
    pub(crate) fn new(id: &str, node: NodeId, descriptor: ViewDescriptor, scene: SharedScene) -> Self {
        Self {
            id: Arc::from(id),
            node,
            descriptor,
            scene,
            cancellation: CancellationToken::new(),
        }
    }

    //--- Identity ---------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn descriptor(&self) -> &ViewDescriptor {
        &self.descriptor
    }

    pub fn kind(&self) -> ViewKind {
        self.descriptor.kind
    }

    pub fn is_modal(&self) -> bool {
        self.descriptor.modal
    }

    //--- Visibility -------------------------------------------------------

    /// Activates or deactivates the view's root node.
    pub fn set_active(&self, active: bool) {
        self.scene.lock().set_active(self.node, active);
    }

    pub fn is_active(&self) -> bool {
        self.scene.lock().is_active(self.node)
    }

    //--- Input ------------------------------------------------------------

    /// Lets the view's raycasters accept input again.
    pub fn enable(&self) {
        self.scene.lock().set_raycasters_enabled(self.node, true);
    }

    /// Stops the view's raycasters from accepting input.
    ///
    /// Independent of visibility.
    pub fn disable(&self) {
        self.scene.lock().set_raycasters_enabled(self.node, false);
    }

    /// Returns true if every raycaster in the view accepts input.
    pub fn is_input_enabled(&self) -> bool {
        self.scene
            .lock()
            .raycasters_in_children(self.node)
            .iter()
            .all(|r| r.enabled)
    }

    //--- Rendering --------------------------------------------------------

    /// Snapshot of the view's canvases.
    pub fn canvases(&self) -> Vec<Canvas> {
        self.scene.lock().canvases_in_children(self.node)
    }

    /// Raises every canvas to the descriptor's rendering order.
    ///
    /// A canvas already above the computed order keeps its order. Modal
    /// views are also moved in front of their siblings.
    pub fn apply_sorting_order(&self) {
        let order = self.descriptor.rendering_order();
        let mut scene = self.scene.lock();
        scene.for_each_canvas_mut(self.node, |canvas| {
            canvas.sorting_order = canvas.sorting_order.max(order);
        });
        if self.descriptor.modal {
            scene.set_as_last_sibling(self.node);
        }
    }

    //--- Cancellation -----------------------------------------------------

    /// Token cancelled when the view is disposed.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub(crate) fn dispose(&self) {
        self.cancellation.cancel();
    }
}

//=========================================================================
// Tests
//=========================================================================
