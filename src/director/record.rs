//=========================================================================
// View Record
//=========================================================================
//
// Per-view lifecycle state machine.
//
//   Unloaded ──preload──► Preloading ──► Hidden ⇄ Shown
//       ▲                     │             │
//       └──────── failure ────┘             │
//       └────────────── dispose ────────────┘
//
// The assembled view and its controller live in one `Option`, so a record
// is either fully bound or fully unbound. The services mediator is created
// on first preload and survives reloads until teardown.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::events::{EventHub, ViewEvent};
use super::handler::ViewHandler;
use crate::core::error::DirectorError;
use crate::core::mvcs::{DynController, ErasedMediator, ViewBinding, ViewDescriptor, ViewHandle, ViewKind, ViewRegistry};
use crate::core::scene::{CameraId, NodeId, RenderMode, SharedScene};
use crate::core::view_builder::{BuiltView, ViewBuilder};

//=== ViewState ===========================================================

/// Lifecycle state of one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewState {
    /// Nothing is instantiated for the view.
    #[default]
    Unloaded,

    /// Assembly and controller preload are in progress.
    Preloading,

    /// Loaded and inactive.
    Hidden,

    Shown,
}

//=== PreloadContext ======================================================

/// Director-owned collaborators a record needs to assemble its view.
pub(crate) struct PreloadContext<'a> {
    pub(crate) builder: &'a ViewBuilder,
    pub(crate) registry: &'a ViewRegistry,
    pub(crate) root: NodeId,
    pub(crate) camera: CameraId,
    pub(crate) sorting_layer: &'a str,
    pub(crate) handler: ViewHandler,
    pub(crate) events: &'a EventHub,
}

//=== ViewRecord ==========================================================

struct LoadedView {
    view: ViewHandle,
    controller: Box<dyn DynController>,
}

pub(crate) struct ViewRecord {
    id: String,
    scene: SharedScene,
    state: ViewState,
    descriptor: Option<ViewDescriptor>,
    binding: Option<Arc<dyn ViewBinding>>,
    mediator: Option<ErasedMediator>,
    loaded: Option<LoadedView>,
}

impl ViewRecord {
    pub(crate) fn new(id: impl Into<String>, scene: SharedScene) -> Self {
        Self {
            id: id.into(),
            scene,
            state: ViewState::Unloaded,
            descriptor: None,
            binding: None,
            mediator: None,
            loaded: None,
        }
    }

    //--- Queries ----------------------------------------------------------

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn state(&self) -> ViewState {
        self.state
    }

    /// Kind declared by the view component, once it has been loaded at
    /// least once.
    pub(crate) fn kind(&self) -> Option<ViewKind> {
        self.descriptor.map(|d| d.kind)
    }

    pub(crate) fn is_modal(&self) -> bool {
        self.descriptor.is_some_and(|d| d.modal)
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub(crate) fn view(&self) -> Option<&ViewHandle> {
        self.loaded.as_ref().map(|l| &l.view)
    }

    //--- Preload ----------------------------------------------------------

    /// Assembles the view, binds its controller and leaves it hidden.
    ///
    /// A record that is already loaded is left untouched. On failure the
    /// instantiated node is destroyed and the record returns to
    /// `Unloaded`.
    pub(crate) async fn preload(&mut self, ctx: &PreloadContext<'_>) -> Result<(), DirectorError> {
        if self.loaded.is_some() {
            debug!("View {} already loaded, preload skipped", self.id);
            return Ok(());
        }

        self.state = ViewState::Preloading;
        let built = match ctx.builder.build(&self.id, ctx.root).await {
            Ok(built) => built,
            Err(err) => {
                self.state = ViewState::Unloaded;
                return Err(err);
            }
        };

        let node = built.node;
        match self.bind(ctx, built).await {
            Ok(loaded) => {
                self.loaded = Some(loaded);
                self.state = ViewState::Hidden;
                debug!("Preloaded view {} as {:?}", self.id, node);
                ctx.events.emit(ViewEvent::Preloaded {
                    id: self.id.clone(),
                    node,
                });
                Ok(())
            }
            Err(err) => {
                warn!("Preload of view {} failed: {}", self.id, err);
                self.scene.lock().destroy(node);
                self.state = ViewState::Unloaded;
                Err(err)
            }
        }
    }

    async fn bind(&mut self, ctx: &PreloadContext<'_>, built: BuiltView) -> Result<LoadedView, DirectorError> {
        let descriptor = built
            .descriptor
            .ok_or_else(|| DirectorError::MissingViewComponent(self.id.clone()))?;

        {
            let mut scene = self.scene.lock();
            scene.for_each_canvas_mut(built.node, |canvas| {
                canvas.render_mode = RenderMode::ScreenSpaceCamera;
                canvas.camera = Some(ctx.camera);
                canvas.sorting_layer = ctx.sorting_layer.to_owned();
            });
            scene.set_active(built.node, false);
        }
        self.descriptor = Some(descriptor);

        let binding = match &self.binding {
            Some(binding) => binding.clone(),
            None => {
                let binding = ctx
                    .registry
                    .resolve(&self.id)
                    .ok_or_else(|| DirectorError::MissingBinding(self.id.clone()))?;
                self.binding = Some(binding.clone());
                binding
            }
        };

        let mediator = self
            .mediator
            .get_or_insert_with(|| binding.build_mediator(ctx.handler.clone()))
            .clone();

        let model = binding
            .create_model(&mediator)
            .await
            .ok_or_else(|| DirectorError::BindingMismatch(self.id.clone()))?
            .map_err(|err| DirectorError::view(&self.id, err))?;

        let view = ViewHandle::new(&self.id, built.node, descriptor, self.scene.clone());
        let mut controller = binding
            .build_controller(view.clone(), model, &mediator)
            .ok_or_else(|| DirectorError::BindingMismatch(self.id.clone()))?;

        if let Err(err) = controller.preload().await {
            controller.dispose();
            return Err(DirectorError::view(&self.id, err));
        }

        view.apply_sorting_order();
        Ok(LoadedView { view, controller })
    }

    //--- Show / Hide ------------------------------------------------------

    pub(crate) async fn show(&mut self) -> Result<(), DirectorError> {
        let loaded = self
            .loaded
            .as_mut()
            .ok_or_else(|| DirectorError::ViewNotLoaded(self.id.clone()))?;

        // Siblings may have been reordered since preload.
        loaded.view.apply_sorting_order();
        loaded
            .controller
            .show()
            .await
            .map_err(|err| DirectorError::view(&self.id, err))?;

        self.state = ViewState::Shown;
        debug!("Shown view {}", self.id);
        Ok(())
    }

    pub(crate) async fn hide(&mut self) -> Result<(), DirectorError> {
        let loaded = self
            .loaded
            .as_mut()
            .ok_or_else(|| DirectorError::ViewNotLoaded(self.id.clone()))?;

        let result = loaded
            .controller
            .hide()
            .await
            .map_err(|err| DirectorError::view(&self.id, err));

        self.state = ViewState::Hidden;
        debug!("Hidden view {}", self.id);
        result
    }

    /// Builds a fresh model and hands it to the bound controller.
    pub(crate) async fn reshow(&mut self) -> Result<(), DirectorError> {
        let (Some(binding), Some(mediator)) = (self.binding.clone(), self.mediator.clone()) else {
            return Err(DirectorError::ViewNotLoaded(self.id.clone()));
        };
        if self.loaded.is_none() {
            return Err(DirectorError::ViewNotLoaded(self.id.clone()));
        }

        let model = binding
            .create_model(&mediator)
            .await
            .ok_or_else(|| DirectorError::BindingMismatch(self.id.clone()))?
            .map_err(|err| DirectorError::view(&self.id, err))?;

        // The record may have been disposed while the model was built.
        let loaded = self
            .loaded
            .as_mut()
            .ok_or_else(|| DirectorError::ViewNotLoaded(self.id.clone()))?;
        loaded
            .controller
            .reshow(model)
            .map_err(|_| DirectorError::BindingMismatch(self.id.clone()))?;

        debug!("Reshown view {}", self.id);
        Ok(())
    }

    //--- Teardown ---------------------------------------------------------

    /// Emits `Disposed`, disposes the controller and destroys the view.
    ///
    /// The mediator and binding are kept for the next preload.
    pub(crate) fn dispose(&mut self, events: &EventHub) {
        self.state = ViewState::Unloaded;
        let Some(mut loaded) = self.loaded.take() else {
            return;
        };

        let node = loaded.view.node();
        events.emit(ViewEvent::Disposed {
            id: self.id.clone(),
            node,
        });
        loaded.controller.dispose();
        self.scene.lock().destroy(node);
        debug!("Disposed view {}", self.id);
    }

    /// Releases the services mediator. Used at full teardown only.
    pub(crate) fn dispose_mediator(&mut self) {
        if let (Some(binding), Some(mediator)) = (&self.binding, self.mediator.take()) {
            binding.dispose_mediator(&mediator);
        }
    }
}

impl fmt::Debug for ViewRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRecord")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("descriptor", &self.descriptor)
            .field("loaded", &self.loaded.as_ref().map(|l| l.view.node()))
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
