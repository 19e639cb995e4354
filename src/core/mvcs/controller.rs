//=========================================================================
// Model, Services Mediator and Controller
//=========================================================================
//
// The three user-implemented layers bound to every view.
//
//   View ──► Controller<Model, Mediator>
//                │           └─► ServicesMediator (one per view record,
//                │                                 survives reshows)
//                └─► Model (rebuilt on every show and reshow)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use async_trait::async_trait;

//=== Internal Dependencies ===============================================

use super::view::ViewHandle;
use crate::core::error::ViewError;
use crate::director::ViewHandler;

//=== Model ===============================================================

/// Per-show data state of a view.
///
/// Models are built fresh by the services mediator on every show and
/// reshow, so they must be default-constructible.
pub trait Model: Default + Send + Sync + 'static {}

//=== ServicesMediator ====================================================

/// Long-lived bridge between a controller and the rest of the application.
///
/// Created lazily once per view record and kept across reshows.
#[async_trait]
pub trait ServicesMediator: Send + Sync + Sized + 'static {
    /// Builds the mediator. `handler` lets services show and hide views.
    fn new(handler: ViewHandler) -> Self;

    /// Builds the model for a show or reshow.
    ///
    /// Default implementation returns `M::default()`.
    async fn create_model<M: Model>(&self) -> Result<M, ViewError> {
        Ok(M::default())
    }

    /// Called when the record owning the mediator is torn down.
    fn on_disposed(&self) {}
}

//=== Controller ==========================================================

/// Mediates between a view and its model and services.
///
/// The associated types declare the model and mediator the controller is
/// bound to. Register a controller for a view id with
/// [`ViewRegistry::bind`](super::ViewRegistry::bind).
///
/// # Minimal Implementation
///
/// ```rust
/// # use std::sync::Arc;
/// # use aetheric_ui::prelude::*;
/// #[derive(Default)]
/// struct HudModel { coins: u32 }
/// impl Model for HudModel {}
///
/// struct HudServices { handler: ViewHandler }
/// impl ServicesMediator for HudServices {
///     fn new(handler: ViewHandler) -> Self { Self { handler } }
/// }
///
/// struct HudController { view: ViewHandle, model: HudModel }
///
/// impl Controller for HudController {
///     type Model = HudModel;
///     type Mediator = HudServices;
///
///     fn new(view: ViewHandle, model: HudModel, _services: Arc<HudServices>) -> Self {
///         Self { view, model }
///     }
///
///     fn view(&self) -> &ViewHandle { &self.view }
///
///     fn reshow(&mut self, model: HudModel) { self.model = model; }
/// }
/// ```
#[async_trait]
pub trait Controller: Send + Sync + Sized + 'static {
    type Model: Model;
    type Mediator: ServicesMediator;

    /// Constructs the controller. Argument order is fixed.
    fn new(view: ViewHandle, model: Self::Model, mediator: Arc<Self::Mediator>) -> Self;

    /// The view this controller drives.
    fn view(&self) -> &ViewHandle;

    /// Runs once after construction, before the view is first shown.
    async fn preload(&mut self) -> Result<(), ViewError> {
        Ok(())
    }

    /// Default implementation activates the view.
    async fn show(&mut self) -> Result<(), ViewError> {
        self.view().set_active(true);
        Ok(())
    }

    /// Default implementation deactivates the view.
    async fn hide(&mut self) -> Result<(), ViewError> {
        self.view().set_active(false);
        Ok(())
    }

    /// Replaces the model of an already shown view.
    fn reshow(&mut self, model: Self::Model);

    /// Called after the view has been disposed and its token cancelled.
    fn on_disposed(&mut self) {}
}
