//=========================================================================
// Error Types
//=========================================================================
//
// Error taxonomy for the UI orchestration layer.
//
// Categories:
//   AssetError    - resource loader failures (cloneable, shared between
//                   every awaiter of one in-flight load)
//   ConfigError   - startup configuration and view catalog problems
//   ViewError     - failures raised by user controllers and mediators
//   DirectorError - everything the orchestrator surfaces to callers
//
// Configuration errors are never retried. They are returned at the call
// site that detected them and the caller decides whether to abort.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;

use thiserror::Error;

//=== AssetError ==========================================================

/// Errors produced while loading an addressed asset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// The loader has nothing registered under the address.
    #[error("no asset registered at address `{0}`")]
    NotFound(String),

    /// The loader resolved the operation in a failed state.
    #[error("loading `{address}` failed: {reason}")]
    Failed { address: String, reason: String },

    /// The asset exists but is not of the requested type.
    #[error("asset at `{address}` is not a `{expected}`")]
    TypeMismatch {
        address: String,
        expected: &'static str,
    },
}

//=== ConfigError =========================================================

/// Errors raised while loading configuration or discovering view ids.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The same view identifier was declared twice.
    #[error("duplicate view id `{id}` declared in `{source_name}`")]
    DuplicateViewId { id: String, source_name: String },

    #[error("empty view id declared in `{source_name}`")]
    EmptyViewId { source_name: String },
}

//=== ViewError ===========================================================

/// Failure reported by a controller, view or services mediator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ViewError {
    message: String,
}

impl ViewError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

//=== DirectorError =======================================================

/// Errors surfaced by the [`Director`](crate::Director).
#[derive(Debug, Error)]
pub enum DirectorError {
    /// The id is not part of the preloaded view catalog.
    #[error("unknown view `{0}`")]
    UnknownView(String),

    /// No controller is bound to the view id in the registry.
    #[error("no controller bound to view `{0}`")]
    MissingBinding(String),

    /// The prefab loaded but carries no view component.
    #[error("prefab for view `{0}` has no view component")]
    MissingViewComponent(String),

    #[error("failed to load prefab for view `{view}`: {source}")]
    PrefabLoad {
        view: String,
        #[source]
        source: AssetError,
    },

    #[error("failed to instantiate view `{0}`")]
    Instantiate(String),

    /// The registered binding produced instances of unexpected types.
    #[error("binding for view `{0}` produced mismatched model or mediator types")]
    BindingMismatch(String),

    #[error("view `{view}` failed: {source}")]
    View {
        view: String,
        #[source]
        source: ViewError,
    },

    #[error("view `{0}` is not loaded")]
    ViewNotLoaded(String),

    #[error("views are already preloaded")]
    AlreadyPreloaded,

    /// A [`ViewHandler`](crate::ViewHandler) outlived its director.
    #[error("director has been dropped")]
    DirectorDropped,

    /// A spawned reshow task panicked or was aborted.
    #[error("task for view `{view}` did not complete: {reason}")]
    TaskFailed { view: String, reason: String },
}

impl DirectorError {
    pub(crate) fn view(view: &str, source: ViewError) -> Self {
        Self::View {
            view: view.to_owned(),
            source,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
