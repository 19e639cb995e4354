//=========================================================================
// MVCS Layer
//=========================================================================
//
// Model / View / Controller / ServicesMediator contracts and the registry
// that binds them to view ids.
//
// Flow:
//   ViewRegistry::bind::<C>(id)
//     → preload: mediator (once) → model → C::new(view, model, mediator)
//     → show / hide / reshow(model) / dispose
//
//=========================================================================

//=== Module Declarations =================================================

mod binding;
mod controller;
mod view;

//=== Public API ==========================================================

pub use binding::ViewRegistry;
pub use controller::{Controller, Model, ServicesMediator};
pub use view::{ViewDescriptor, ViewHandle, ViewKind};

//=== Internal API ========================================================

pub(crate) use binding::{DynController, ErasedMediator, ViewBinding};
