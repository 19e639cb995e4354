//=========================================================================
// View Handler
//=========================================================================
//
// Non-owning handle services use to show and hide views.
//
// Every services mediator receives one at construction. It holds a weak
// reference, so a mediator never keeps its director alive.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::sync::{Arc, Weak};

//=== Internal Dependencies ===============================================

use super::{DirectorInner, ShowOutcome};
use crate::core::error::DirectorError;

//=== ViewHandler =========================================================

/// Show/hide access to a [`Director`](super::Director) without owning it.
///
/// Calls made after the director has been dropped fail with
/// [`DirectorError::DirectorDropped`].
///
/// A controller must not show or hide its own view through the handler
/// while one of its lifecycle methods is running: the call waits for the
/// view's lifecycle lock, which the running method holds.
#[derive(Clone, Default)]
pub struct ViewHandler {
    inner: Weak<DirectorInner>,
}

impl ViewHandler {
    pub(crate) fn new(inner: &Arc<DirectorInner>) -> Self {
        Self {
            inner: Arc::downgrade(inner),
        }
    }

    /// A handler bound to no director.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub async fn show_view(&self, id: &str) -> Result<ShowOutcome, DirectorError> {
        self.upgrade()?.show_view(id).await
    }

    pub async fn hide_view(&self, id: &str) -> Result<(), DirectorError> {
        self.upgrade()?.hide_view(id).await
    }

    fn upgrade(&self) -> Result<Arc<DirectorInner>, DirectorError> {
        self.inner.upgrade().ok_or(DirectorError::DirectorDropped)
    }
}

impl fmt::Debug for ViewHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewHandler")
            .field("attached", &self.is_attached())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
