//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_ui::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Orchestrator
pub use crate::director::{
    CollectStatus, Director, DirectorBuilder, ReshowTask, ShowOutcome, ViewEvent, ViewEventCollector,
    ViewHandler, ViewState,
};

// MVCS contracts
pub use crate::core::mvcs::{
    Controller, Model, ServicesMediator, ViewDescriptor, ViewHandle, ViewKind, ViewRegistry,
};

// Assets
pub use crate::core::assets::{AssetLoader, AssetProvider, MemoryAssetLoader};

// Scene
pub use crate::core::scene::{
    CameraId, CanvasTemplate, NodeId, Prefab, PrefabNode, RenderMode, SceneGraph, SharedScene,
};

// Configuration
pub use crate::core::catalog::{ViewCatalog, ViewIdSource};
pub use crate::core::config::UiConfig;
pub use crate::logging::{init_logging, LoggingConfig};

// Errors
pub use crate::core::error::{AssetError, ConfigError, DirectorError, ViewError};
