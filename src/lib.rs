//=========================================================================
// Aetheric UI Library Root
//
// MVCS view orchestration for the Aetheric Engine.
//
// Responsibilities:
// - Load view prefabs asynchronously through a shared asset cache
// - Bind every view id to its controller, model and services mediator
// - Drive preload, show, hide, reshow and dispose of every view
// - Keep modal views in front and freeze input beneath them
//
// Typical usage:
// ```no_run
// let config = UiConfig::load("ui.toml")?;
// init_logging(config.logging_config());
//
// let director = DirectorBuilder::new(scene, view_root, camera, loader)
//     .with_config(&config)?
//     .with_registry(registry)
//     .build();
//
// director.preload().await?;
// director.show_view("Shop").await?.wait().await?;
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the subsystems (assets, scene, MVCS contracts, config).
// `director` is the orchestrator built on top of them.
//
pub mod core;
pub mod director;
pub mod logging;
pub mod prelude;

//--- Public Exports ------------------------------------------------------

pub use director::{
    Director, DirectorBuilder, ReshowTask, ShowOutcome, ViewEvent, ViewEventCollector, ViewHandler,
    ViewState,
};
pub use core::error::{AssetError, ConfigError, DirectorError, ViewError};
