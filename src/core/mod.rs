//=========================================================================
// Core Systems
//
// Subsystems the director is built from.
//
// Layout:
// - `assets`       addressed, de-duplicating async asset cache
// - `scene`        host scene graph, canvases, raycasters and prefabs
// - `mvcs`         model / view / controller / services contracts and
//                  the view registry
// - `view_builder` prefab → instantiated view
// - `catalog`      declared view ids
// - `config`       TOML startup configuration
// - `error`        error taxonomy
//
// Everything here is usable on its own. Applications normally go through
// `Director` and the prelude.
//
//=========================================================================

pub mod assets;
pub mod catalog;
pub mod config;
pub mod error;
pub mod mvcs;
pub mod scene;
pub mod view_builder;
