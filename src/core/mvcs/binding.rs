//=========================================================================
// View Registry
//=========================================================================
//
// Explicit view id → controller binding table.
//
// Architecture:
//   bind::<C>(id) ──► TypedBinding<C> (knows C, C::Model, C::Mediator)
//                         │
//                         ▼  erased as Arc<dyn ViewBinding>
//   ViewRecord ──► build_mediator / create_model / build_controller
//                         │
//                         ▼
//                  Box<dyn DynController>
//
// Binding correctness is checked at compile time by the associated types
// of `Controller`. A view id with no binding fails at preload.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::controller::{Controller, ServicesMediator};
use super::view::ViewHandle;
use crate::core::error::ViewError;
use crate::director::ViewHandler;

//=== Erased Instances ====================================================

/// Type-erased services mediator held by a view record.
pub(crate) type ErasedMediator = Arc<dyn Any + Send + Sync>;

/// Type-erased model travelling from mediator to controller.
pub(crate) type BoxedModel = Box<dyn Any + Send + Sync>;

//=== DynController =======================================================

/// Object-safe view of a bound [`Controller`].
#[async_trait]
pub(crate) trait DynController: Send + Sync {
    async fn preload(&mut self) -> Result<(), ViewError>;
    async fn show(&mut self) -> Result<(), ViewError>;
    async fn hide(&mut self) -> Result<(), ViewError>;

    /// Hands a freshly built model to the controller.
    ///
    /// Returns the model back if it is not the controller's model type.
    fn reshow(&mut self, model: BoxedModel) -> Result<(), BoxedModel>;

    fn dispose(&mut self);
}

struct BoundController<C>(C);

#[async_trait]
impl<C: Controller> DynController for BoundController<C> {
    async fn preload(&mut self) -> Result<(), ViewError> {
        self.0.preload().await
    }

    async fn show(&mut self) -> Result<(), ViewError> {
        self.0.show().await
    }

    async fn hide(&mut self) -> Result<(), ViewError> {
        self.0.hide().await
    }

    fn reshow(&mut self, model: BoxedModel) -> Result<(), BoxedModel> {
        let model = model.downcast::<C::Model>()?;
        self.0.reshow(*model);
        Ok(())
    }

    fn dispose(&mut self) {
        self.0.view().dispose();
        self.0.on_disposed();
    }
}

//=== ViewBinding =========================================================

/// Factory bundle for one view: mediator, model and controller.
#[async_trait]
pub(crate) trait ViewBinding: Send + Sync {
    fn controller_name(&self) -> &'static str;

    fn build_mediator(&self, handler: ViewHandler) -> ErasedMediator;

    async fn create_model(&self, mediator: &ErasedMediator) -> Option<Result<BoxedModel, ViewError>>;

    fn build_controller(
        &self,
        view: ViewHandle,
        model: BoxedModel,
        mediator: &ErasedMediator,
    ) -> Option<Box<dyn DynController>>;

    fn dispose_mediator(&self, mediator: &ErasedMediator);
}

struct TypedBinding<C>(PhantomData<fn() -> C>);

#[async_trait]
impl<C: Controller> ViewBinding for TypedBinding<C> {
    fn controller_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn build_mediator(&self, handler: ViewHandler) -> ErasedMediator {
        Arc::new(C::Mediator::new(handler))
    }

    async fn create_model(&self, mediator: &ErasedMediator) -> Option<Result<BoxedModel, ViewError>> {
        let mediator = mediator.downcast_ref::<C::Mediator>()?;
        let model = mediator
            .create_model::<C::Model>()
            .await
            .map(|model| Box::new(model) as BoxedModel);
        Some(model)
    }

    fn build_controller(
        &self,
        view: ViewHandle,
        model: BoxedModel,
        mediator: &ErasedMediator,
    ) -> Option<Box<dyn DynController>> {
        let mediator = mediator.clone().downcast::<C::Mediator>().ok()?;
        let model = model.downcast::<C::Model>().ok()?;
        Some(Box::new(BoundController(C::new(view, *model, mediator))))
    }

    fn dispose_mediator(&self, mediator: &ErasedMediator) {
        if let Some(mediator) = mediator.downcast_ref::<C::Mediator>() {
            mediator.on_disposed();
        }
    }
}

//=== ViewRegistry ========================================================

/// Maps view ids to the controller bound to them.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = ViewRegistry::new();
/// registry
///     .bind::<HudController>("Hud")
///     .bind::<ShopController>("Shop");
/// ```
#[derive(Default, Clone)]
pub struct ViewRegistry {
    bindings: HashMap<String, Arc<dyn ViewBinding>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds controller `C` (and its model and mediator) to `view_id`.
    ///
    /// An existing binding for the same id is replaced.
    pub fn bind<C: Controller>(&mut self, view_id: impl Into<String>) -> &mut Self {
        let view_id = view_id.into();
        let binding: Arc<dyn ViewBinding> = Arc::new(TypedBinding::<C>(PhantomData));
        debug!("Bound view {} to {}", view_id, binding.controller_name());

        if let Some(previous) = self.bindings.insert(view_id.clone(), binding) {
            warn!(
                "View {} was already bound to {} and has been rebound",
                view_id,
                previous.controller_name()
            );
        }
        self
    }

    /// Builder-style variant of [`bind`](Self::bind).
    pub fn with<C: Controller>(mut self, view_id: impl Into<String>) -> Self {
        self.bind::<C>(view_id);
        self
    }

    pub fn contains(&self, view_id: &str) -> bool {
        self.bindings.contains_key(view_id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Type name of the controller bound to `view_id`.
    pub fn controller_name(&self, view_id: &str) -> Option<&'static str> {
        self.bindings.get(view_id).map(|b| b.controller_name())
    }

    pub(crate) fn resolve(&self, view_id: &str) -> Option<Arc<dyn ViewBinding>> {
        self.bindings.get(view_id).cloned()
    }
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut views: Vec<_> = self.bindings.keys().collect();
        views.sort();
        f.debug_struct("ViewRegistry").field("views", &views).finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
