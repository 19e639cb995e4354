//=========================================================================
// View Catalog
//=========================================================================
//
// The de-duplicated list of every declared view id.
//
// View ids are declared in named groups (one per feature or screen set).
// Discovery flattens the groups in declaration order and rejects an id
// declared twice anywhere.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use serde::Deserialize;

//=== Internal Dependencies ===============================================

use crate::core::error::ConfigError;

//=== ViewIdSource ========================================================

/// One named declaration of view ids.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewIdSource {
    pub name: String,
    pub ids: Vec<String>,
}

impl ViewIdSource {
    pub fn new<I, S>(name: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

//=== ViewCatalog =========================================================

/// Ordered set of unique view ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewCatalog {
    ids: Vec<String>,
}

impl ViewCatalog {
    /// Flattens `sources` into one catalog.
    ///
    /// Fails on the first id that was already declared, in this or an
    /// earlier source, and on empty ids.
    pub fn discover(sources: &[ViewIdSource]) -> Result<Self, ConfigError> {
        let mut declared_in: HashMap<&str, &str> = HashMap::new();
        let mut ids = Vec::new();

        for source in sources {
            for id in &source.ids {
                if id.is_empty() {
                    return Err(ConfigError::EmptyViewId {
                        source_name: source.name.clone(),
                    });
                }
                if declared_in.insert(id.as_str(), source.name.as_str()).is_some() {
                    return Err(ConfigError::DuplicateViewId {
                        id: id.clone(),
                        source_name: source.name.clone(),
                    });
                }
                ids.push(id.clone());
            }
        }

        Ok(Self { ids })
    }

    /// Builds a catalog from a single anonymous list of ids.
    pub fn from_ids<I, S>(ids: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::discover(&[ViewIdSource::new("<inline>", ids)])
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

//=========================================================================
// Tests
//=========================================================================
