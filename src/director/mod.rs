//=========================================================================
// Director
//=========================================================================
//
// View lifecycle orchestrator.
//
// Architecture:
// ```text
//   DirectorBuilder ──build()──► Director (cheap clone, Arc<DirectorInner>)
//                                   │
//                                   ├─ records:    id → Arc<tokio::Mutex<ViewRecord>>
//                                   ├─ visibility: shown set, modal stack,
//                                   │              shown view handles
//                                   ├─ builder:    ViewBuilder → AssetProvider
//                                   └─ events:     EventHub → subscribers
// ```
//
// Locking:
// - Each record sits behind its own async mutex. Show, hide and reshow on
//   one id run one at a time, in arrival order. Different ids never block
//   each other.
// - Director-wide sets live behind one short-held mutex that is never
//   held across an await.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use futures::future::join_all;
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

//=== Internal Dependencies ===============================================

use crate::core::assets::{AssetLoader, AssetProvider};
use crate::core::catalog::ViewCatalog;
use crate::core::config::{UiConfig, DEFAULT_SORTING_LAYER};
use crate::core::error::{ConfigError, DirectorError};
use crate::core::mvcs::{ViewHandle, ViewKind, ViewRegistry};
use crate::core::scene::{CameraId, NodeId, SharedScene};
use crate::core::view_builder::ViewBuilder;

mod events;
mod handler;
mod record;

pub use events::{CollectStatus, ViewEvent, ViewEventCollector};
pub use handler::ViewHandler;
pub use record::ViewState;

use events::EventHub;
use record::{PreloadContext, ViewRecord};

type SharedRecord = Arc<AsyncMutex<ViewRecord>>;

//=== ShowOutcome =========================================================

/// What [`Director::show_view`] did.
#[derive(Debug)]
#[must_use = "a reshow runs in the background and reports its error through `wait`"]
pub enum ShowOutcome {
    /// The view was hidden (or unloaded) and is now shown.
    Shown,

    /// The view was already shown. A fresh model is being built and handed
    /// to its controller in the background.
    Reshown(ReshowTask),
}

impl ShowOutcome {
    pub fn is_reshow(&self) -> bool {
        matches!(self, ShowOutcome::Reshown(_))
    }

    /// Waits for a background reshow, if any.
    pub async fn wait(self) -> Result<(), DirectorError> {
        match self {
            ShowOutcome::Shown => Ok(()),
            ShowOutcome::Reshown(task) => task.wait().await,
        }
    }
}

/// Background reshow of an already shown view.
///
/// Dropping the task does not cancel the reshow.
#[derive(Debug)]
#[must_use = "dropping the task discards the reshow's error"]
pub struct ReshowTask {
    view: String,
    handle: JoinHandle<Result<(), DirectorError>>,
}

impl ReshowTask {
    pub fn view_id(&self) -> &str {
        &self.view
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> Result<(), DirectorError> {
        match self.handle.await {
            Ok(result) => result,
            Err(err) => Err(DirectorError::TaskFailed {
                view: self.view,
                reason: err.to_string(),
            }),
        }
    }
}

//=== DirectorBuilder =====================================================

/// Builder for a [`Director`].
///
/// The scene, view root, camera and asset loader are required. The view
/// catalog and registry default to empty and the sorting layer to `"UI"`.
///
/// # Examples
///
/// ```no_run
/// # use std::sync::Arc;
/// # use aetheric_ui::prelude::*;
/// # async fn run(registry: ViewRegistry) -> Result<(), Box<dyn std::error::Error>> {
/// let scene = SceneGraph::shared();
/// let root = scene.lock().create_node("ViewRoot", None).ok_or("no root")?;
/// let config = UiConfig::load("ui.toml")?;
///
/// let director = DirectorBuilder::new(scene, root, CameraId(0), Arc::new(MemoryAssetLoader::new()))
///     .with_config(&config)?
///     .with_registry(registry)
///     .build();
///
/// director.preload().await?;
/// director.show_view("Shop").await?.wait().await?;
/// # Ok(())
/// # }
/// ```
pub struct DirectorBuilder {
    scene: SharedScene,
    view_root: NodeId,
    camera: CameraId,
    loader: Arc<dyn AssetLoader>,
    registry: ViewRegistry,
    catalog: ViewCatalog,
    sorting_layer: String,
}

impl DirectorBuilder {
    pub fn new(scene: SharedScene, view_root: NodeId, camera: CameraId, loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            scene,
            view_root,
            camera,
            loader,
            registry: ViewRegistry::new(),
            catalog: ViewCatalog::default(),
            sorting_layer: DEFAULT_SORTING_LAYER.to_string(),
        }
    }

    /// Sets the view id → controller bindings.
    pub fn with_registry(mut self, registry: ViewRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the views created and preloaded by [`Director::preload`].
    pub fn with_catalog(mut self, catalog: ViewCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the sorting layer stamped on every view canvas.
    pub fn with_sorting_layer(mut self, sorting_layer: impl Into<String>) -> Self {
        self.sorting_layer = sorting_layer.into();
        self
    }

    /// Applies the catalog and sorting layer from `config`.
    ///
    /// Fails if the configured view ids contain duplicates.
    pub fn with_config(mut self, config: &UiConfig) -> Result<Self, ConfigError> {
        self.catalog = config.catalog()?;
        self.sorting_layer = config.sorting_layer.clone();
        Ok(self)
    }

    pub fn build(self) -> Director {
        let unbound: Vec<&str> = self
            .catalog
            .iter()
            .filter(|id| !self.registry.contains(id))
            .collect();
        if !unbound.is_empty() {
            warn!("Views without a bound controller will fail to preload: {:?}", unbound);
        }

        info!(
            "Building director ({} view(s), sorting layer {})",
            self.catalog.len(),
            self.sorting_layer
        );

        let assets = Arc::new(AssetProvider::new(self.loader));
        Director {
            inner: Arc::new(DirectorInner {
                builder: ViewBuilder::new(assets, self.scene.clone()),
                registry: self.registry,
                catalog: self.catalog,
                scene: self.scene,
                view_root: self.view_root,
                camera: self.camera,
                sorting_layer: self.sorting_layer,
                records: RwLock::new(HashMap::new()),
                visibility: Mutex::new(Visibility::default()),
                events: EventHub::default(),
            }),
        }
    }
}

//=== Director ============================================================

/// Owns every view record and the shown set and modal stack.
///
/// Cloning is cheap and every clone drives the same views.
#[derive(Clone)]
pub struct Director {
    inner: Arc<DirectorInner>,
}

impl Director {
    //--- Lifecycle --------------------------------------------------------

    /// Creates a record per catalog id and preloads them all concurrently.
    ///
    /// Every preload settles before anything else happens. If any failed,
    /// the whole wave is torn down and the first failure (in catalog
    /// order) is returned. Otherwise dynamic views are unloaded and every
    /// other view is shown, in catalog order.
    pub async fn preload(&self) -> Result<(), DirectorError> {
        self.inner.preload().await
    }

    /// Shows `id`, loading it first if it is dynamic.
    ///
    /// Showing an already shown view starts a reshow instead.
    pub async fn show_view(&self, id: &str) -> Result<ShowOutcome, DirectorError> {
        self.inner.show_view(id).await
    }

    /// Hides `id`, unloading it if it is dynamic.
    ///
    /// Hiding a view that is not shown does nothing.
    pub async fn hide_view(&self, id: &str) -> Result<(), DirectorError> {
        self.inner.hide_view(id).await
    }

    /// Disposes every view, releases every asset and forgets all state.
    ///
    /// The director can be preloaded again afterwards.
    pub async fn teardown(&self) {
        self.inner.teardown().await;
    }

    //--- Collaborators ----------------------------------------------------

    /// Receives a [`ViewEvent`] for every preload and dispose from now on.
    pub fn subscribe(&self) -> Receiver<ViewEvent> {
        self.inner.events.subscribe()
    }

    /// A non-owning handle for services.
    pub fn handler(&self) -> ViewHandler {
        ViewHandler::new(&self.inner)
    }

    pub fn assets(&self) -> &Arc<AssetProvider> {
        self.inner.builder.assets()
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.inner.registry
    }

    //--- Queries ----------------------------------------------------------

    pub fn is_shown(&self, id: &str) -> bool {
        self.inner.visibility.lock().is_shown(id)
    }

    /// Shown view ids, oldest first.
    pub fn shown_views(&self) -> Vec<String> {
        self.inner.visibility.lock().shown.clone()
    }

    /// Shown modal view ids, front-most last.
    pub fn modal_stack(&self) -> Vec<String> {
        self.inner.visibility.lock().modal_stack.clone()
    }

    /// Handle of a currently shown view.
    pub fn view_handle(&self, id: &str) -> Option<ViewHandle> {
        self.inner.visibility.lock().views.get(id).cloned()
    }

    /// Lifecycle state of `id`.
    ///
    /// Waits for any show, hide or reshow in progress on the view.
    pub async fn view_state(&self, id: &str) -> Result<ViewState, DirectorError> {
        let record = self.inner.record(id)?;
        let state = record.lock().await.state();
        Ok(state)
    }

    /// Every catalog id, in declaration order.
    pub fn view_ids(&self) -> Vec<String> {
        self.inner.catalog.iter().map(str::to_owned).collect()
    }
}

impl fmt::Debug for Director {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visibility = self.inner.visibility.lock();
        f.debug_struct("Director")
            .field("views", &self.inner.catalog.len())
            .field("preloaded", &visibility.preloaded)
            .field("shown", &visibility.shown)
            .field("modal_stack", &visibility.modal_stack)
            .finish()
    }
}

//=== Visibility ==========================================================

#[derive(Default)]
struct Visibility {
    preloaded: bool,
    shown: Vec<String>,
    modal_stack: Vec<String>,
    views: HashMap<String, ViewHandle>,
}

impl Visibility {
    fn is_shown(&self, id: &str) -> bool {
        self.shown.iter().any(|shown| shown == id)
    }

    /// Removes `id` from the shown set. Returns false if it was not shown.
    fn take_shown(&mut self, id: &str) -> bool {
        let before = self.shown.len();
        self.shown.retain(|shown| shown != id);
        self.shown.len() != before
    }

    /// Freezes input on every shown view except the front-most modal.
    fn refresh_input(&self) {
        let front = self.modal_stack.last();
        for (id, view) in &self.views {
            match front {
                Some(front) if front != id => view.disable(),
                _ => view.enable(),
            }
        }
    }
}

//=== DirectorInner =======================================================

pub(crate) struct DirectorInner {
    builder: ViewBuilder,
    registry: ViewRegistry,
    catalog: ViewCatalog,
    scene: SharedScene,
    view_root: NodeId,
    camera: CameraId,
    sorting_layer: String,
    records: RwLock<HashMap<String, SharedRecord>>,
    visibility: Mutex<Visibility>,
    events: EventHub,
}

impl DirectorInner {
    fn context(self: &Arc<Self>) -> PreloadContext<'_> {
        PreloadContext {
            builder: &self.builder,
            registry: &self.registry,
            root: self.view_root,
            camera: self.camera,
            sorting_layer: &self.sorting_layer,
            handler: ViewHandler::new(self),
            events: &self.events,
        }
    }

    fn record(&self, id: &str) -> Result<SharedRecord, DirectorError> {
        self.records
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| DirectorError::UnknownView(id.to_owned()))
    }

    //--- Preload ----------------------------------------------------------

    async fn preload(self: &Arc<Self>) -> Result<(), DirectorError> {
        {
            let mut visibility = self.visibility.lock();
            if visibility.preloaded {
                return Err(DirectorError::AlreadyPreloaded);
            }
            visibility.preloaded = true;
        }

        let records: Vec<(String, SharedRecord)> = self
            .catalog
            .iter()
            .map(|id| {
                let record = ViewRecord::new(id, self.scene.clone());
                (id.to_owned(), Arc::new(AsyncMutex::new(record)))
            })
            .collect();
        self.records.write().extend(records.iter().cloned());
        info!("Preloading {} view(s)", records.len());

        let ctx = self.context();
        let preloads = records.iter().map(|(_, record)| {
            let ctx = &ctx;
            async move { record.lock().await.preload(ctx).await }
        });
        let results = join_all(preloads).await;

        if let Some(err) = results.into_iter().find_map(Result::err) {
            warn!("Preload aborted: {}", err);
            self.teardown().await;
            return Err(err);
        }

        let mut first_error = None;
        for (id, record) in &records {
            let unloaded = {
                let mut record = record.lock().await;
                if record.kind() == Some(ViewKind::Dynamic) {
                    self.unload(&mut record);
                    true
                } else {
                    false
                }
            };
            if unloaded {
                continue;
            }
            if let Err(err) = self.show_view(id).await {
                first_error.get_or_insert(err);
            }
        }

        if let Some(err) = first_error {
            warn!("Preload aborted, a static view failed to show: {}", err);
            self.teardown().await;
            return Err(err);
        }

        info!("Preload complete, {} view(s) shown", self.visibility.lock().shown.len());
        Ok(())
    }

    //--- Show -------------------------------------------------------------

    async fn show_view(self: &Arc<Self>, id: &str) -> Result<ShowOutcome, DirectorError> {
        let record = self.record(id)?;
        let mut record = record.lock_owned().await;

        let already_shown = self.visibility.lock().is_shown(id);
        if already_shown {
            debug!("View {} already shown, reshowing", id);
            let handle = tokio::spawn(async move { record.reshow().await });
            return Ok(ShowOutcome::Reshown(ReshowTask {
                view: id.to_owned(),
                handle,
            }));
        }

        self.visibility.lock().shown.push(id.to_owned());

        match self.present(&mut record).await {
            Ok(view) => {
                let mut visibility = self.visibility.lock();
                visibility.views.insert(id.to_owned(), view);
                visibility.refresh_input();
                Ok(ShowOutcome::Shown)
            }
            Err(err) => {
                warn!("Show of view {} failed: {}", id, err);
                {
                    let mut visibility = self.visibility.lock();
                    visibility.take_shown(id);
                    visibility.modal_stack.retain(|modal| modal != id);
                    visibility.refresh_input();
                }
                if record.kind() == Some(ViewKind::Dynamic) {
                    self.unload(&mut record);
                }
                Err(err)
            }
        }
    }

    /// Loads the record if needed, stacks it if modal and shows it.
    async fn present(self: &Arc<Self>, record: &mut ViewRecord) -> Result<ViewHandle, DirectorError> {
        if !record.is_loaded() {
            record.preload(&self.context()).await?;
        }

        if record.is_modal() {
            self.visibility.lock().modal_stack.push(record.id().to_owned());
        }

        record.show().await?;
        record
            .view()
            .cloned()
            .ok_or_else(|| DirectorError::ViewNotLoaded(record.id().to_owned()))
    }

    //--- Hide -------------------------------------------------------------

    async fn hide_view(&self, id: &str) -> Result<(), DirectorError> {
        let record = self.record(id)?;
        let mut record = record.lock().await;

        let was_shown = self.visibility.lock().take_shown(id);
        if !was_shown {
            debug!("Hide of view {} ignored, it is not shown", id);
            return Ok(());
        }

        let result = record.hide().await;

        {
            let mut visibility = self.visibility.lock();
            visibility.modal_stack.retain(|modal| modal != id);
            visibility.views.remove(id);
            visibility.refresh_input();
        }

        if record.kind() == Some(ViewKind::Dynamic) {
            self.unload(&mut record);
        }
        result
    }

    //--- Teardown ---------------------------------------------------------

    /// Disposes the record's view and releases its prefab.
    fn unload(&self, record: &mut ViewRecord) {
        record.dispose(&self.events);
        self.builder.unload(record.id());
    }

    async fn teardown(&self) {
        let records: Vec<SharedRecord> = {
            let mut map = self.records.write();
            self.catalog.iter().filter_map(|id| map.remove(id)).collect()
        };

        for record in &records {
            let mut record = record.lock().await;
            record.dispose(&self.events);
            record.dispose_mediator();
        }

        self.builder.clean_up();
        *self.visibility.lock() = Visibility::default();
        info!("Director torn down ({} view(s) disposed)", records.len());
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::core::assets::MemoryAssetLoader;
    use crate::core::error::ViewError;
    use crate::core::mvcs::{Controller, Model, ServicesMediator, ViewDescriptor};
    use crate::core::scene::{CanvasTemplate, Prefab, PrefabNode, SceneGraph};

    //--- Test controllers -------------------------------------------------

    #[derive(Default)]
    struct PlainModel;
    impl Model for PlainModel {}

    struct PlainServices;
    impl ServicesMediator for PlainServices {
        fn new(_handler: ViewHandler) -> Self {
            PlainServices
        }
    }

    struct PlainController(ViewHandle);
    impl Controller for PlainController {
        type Model = PlainModel;
        type Mediator = PlainServices;

        fn new(view: ViewHandle, _model: PlainModel, _mediator: Arc<PlainServices>) -> Self {
            Self(view)
        }

        fn view(&self) -> &ViewHandle {
            &self.0
        }

        fn reshow(&mut self, _model: PlainModel) {}
    }

    /// Fails every model build after the first.
    struct FlakyServices {
        builds: AtomicUsize,
    }

    #[async_trait]
    impl ServicesMediator for FlakyServices {
        fn new(_handler: ViewHandler) -> Self {
            Self {
                builds: AtomicUsize::new(0),
            }
        }

        async fn create_model<M: Model>(&self) -> Result<M, ViewError> {
            if self.builds.fetch_add(1, Ordering::SeqCst) > 0 {
                return Err(ViewError::new("inventory service unavailable"));
            }
            Ok(M::default())
        }
    }

    struct FlakyController(ViewHandle);
    impl Controller for FlakyController {
        type Model = PlainModel;
        type Mediator = FlakyServices;

        fn new(view: ViewHandle, _model: PlainModel, _mediator: Arc<FlakyServices>) -> Self {
            Self(view)
        }

        fn view(&self) -> &ViewHandle {
            &self.0
        }

        fn reshow(&mut self, _model: PlainModel) {}
    }

    struct RefusingController(ViewHandle);

    #[async_trait]
    impl Controller for RefusingController {
        type Model = PlainModel;
        type Mediator = PlainServices;

        fn new(view: ViewHandle, _model: PlainModel, _mediator: Arc<PlainServices>) -> Self {
            Self(view)
        }

        fn view(&self) -> &ViewHandle {
            &self.0
        }

        async fn show(&mut self) -> Result<(), ViewError> {
            Err(ViewError::new("refused"))
        }

        fn reshow(&mut self, _model: PlainModel) {}
    }

    static MENU_SHOWS: AtomicUsize = AtomicUsize::new(0);

    // Only the static-show rollback test binds this, so the counter is
    // never shared between tests.
    struct CountingController(ViewHandle);

    #[async_trait]
    impl Controller for CountingController {
        type Model = PlainModel;
        type Mediator = PlainServices;

        fn new(view: ViewHandle, _model: PlainModel, _mediator: Arc<PlainServices>) -> Self {
            Self(view)
        }

        fn view(&self) -> &ViewHandle {
            &self.0
        }

        async fn show(&mut self) -> Result<(), ViewError> {
            MENU_SHOWS.fetch_add(1, Ordering::SeqCst);
            self.0.set_active(true);
            Ok(())
        }

        fn reshow(&mut self, _model: PlainModel) {}
    }

    //--- Fixture ----------------------------------------------------------

    fn prefab(name: &str, descriptor: ViewDescriptor) -> Prefab {
        Prefab::view(
            PrefabNode::new(name)
                .with_canvas(CanvasTemplate { sorting_order: 0 })
                .with_raycasters(1),
            descriptor,
        )
    }

    struct Fixture {
        director: Director,
        scene: SharedScene,
        root: NodeId,
        loader: Arc<MemoryAssetLoader>,
    }

    fn fixture(ids: &[&str], registry: ViewRegistry) -> Fixture {
        let loader = Arc::new(
            MemoryAssetLoader::new()
                .with("Hud.prefab", prefab("Hud", ViewDescriptor::new(ViewKind::Static)))
                .with("Menu.prefab", prefab("Menu", ViewDescriptor::new(ViewKind::Static)))
                .with("Popup.prefab", prefab("Popup", ViewDescriptor::new(ViewKind::Dynamic).modal()))
                .with("Dialog.prefab", prefab("Dialog", ViewDescriptor::new(ViewKind::Dynamic).modal()))
                .with("Toast.prefab", prefab("Toast", ViewDescriptor::new(ViewKind::Dynamic))),
        );
        let scene = SceneGraph::shared();
        let root = scene.lock().create_node("ViewRoot", None).unwrap();

        let director = DirectorBuilder::new(scene.clone(), root, CameraId(1), loader.clone())
            .with_catalog(ViewCatalog::from_ids(ids.iter().copied()).unwrap())
            .with_registry(registry)
            .build();

        Fixture {
            director,
            scene,
            root,
            loader,
        }
    }

    fn plain_registry(ids: &[&str]) -> ViewRegistry {
        let mut registry = ViewRegistry::new();
        for id in ids {
            registry.bind::<PlainController>(*id);
        }
        registry
    }

    fn standard() -> Fixture {
        let ids = ["Hud", "Menu", "Popup", "Dialog", "Toast"];
        fixture(&ids, plain_registry(&ids))
    }

    //--- Preload ----------------------------------------------------------

    #[tokio::test]
    async fn hud_and_popup_scenario() {
        let ids = ["Hud", "Popup"];
        let Fixture { director, .. } = fixture(&ids, plain_registry(&ids));

        director.preload().await.unwrap();
        assert!(director.is_shown("Hud"));
        assert_eq!(director.view_state("Popup").await.unwrap(), ViewState::Unloaded);

        director.show_view("Popup").await.unwrap().wait().await.unwrap();
        assert!(director.is_shown("Popup"));
        assert_eq!(director.modal_stack(), vec!["Popup".to_string()]);

        director.hide_view("Popup").await.unwrap();
        assert_eq!(director.view_state("Popup").await.unwrap(), ViewState::Unloaded);
        assert!(director.modal_stack().is_empty());
        assert!(director.is_shown("Hud"));
        assert_eq!(director.view_state("Hud").await.unwrap(), ViewState::Shown);
    }

    #[tokio::test]
    async fn preload_unloads_every_dynamic_view() {
        let Fixture { director, loader, .. } = standard();

        director.preload().await.unwrap();

        for id in ["Popup", "Dialog", "Toast"] {
            assert_eq!(director.view_state(id).await.unwrap(), ViewState::Unloaded);
            assert!(!director.is_shown(id));
            assert_eq!(loader.release_count(&format!("{id}.prefab")), 1);
        }
    }

    #[tokio::test]
    async fn preload_shows_every_static_view_in_catalog_order() {
        let Fixture { director, .. } = standard();

        director.preload().await.unwrap();

        assert_eq!(director.shown_views(), vec!["Hud".to_string(), "Menu".to_string()]);
        for id in ["Hud", "Menu"] {
            assert_eq!(director.view_state(id).await.unwrap(), ViewState::Shown);
            assert!(director.view_handle(id).unwrap().is_active());
        }
    }

    #[tokio::test]
    async fn preload_twice_is_rejected() {
        let Fixture { director, .. } = standard();

        director.preload().await.unwrap();

        assert!(matches!(
            director.preload().await,
            Err(DirectorError::AlreadyPreloaded)
        ));
    }

    #[tokio::test]
    async fn failed_preload_rolls_back_whole_wave() {
        let ids = ["Hud", "Popup"];
        let Fixture {
            director,
            scene,
            root,
            loader,
        } = fixture(&ids, plain_registry(&["Hud"]));
        let events = director.subscribe();

        let err = director.preload().await.unwrap_err();

        assert!(matches!(err, DirectorError::MissingBinding(id) if id == "Popup"));
        assert!(scene.lock().children(root).is_empty());
        assert!(director.shown_views().is_empty());
        assert_eq!(loader.release_count("Hud.prefab"), 1);
        assert!(events.try_iter().any(|e| matches!(e, ViewEvent::Disposed { .. })));
    }

    #[tokio::test]
    async fn failed_static_show_finishes_wave_then_rolls_back() {
        let ids = ["Hud", "Menu", "Popup"];
        let registry = ViewRegistry::new()
            .with::<RefusingController>("Hud")
            .with::<CountingController>("Menu")
            .with::<PlainController>("Popup");
        let Fixture {
            director,
            scene,
            root,
            loader,
        } = fixture(&ids, registry);

        let err = director.preload().await.unwrap_err();

        assert!(matches!(err, DirectorError::View { ref view, .. } if view == "Hud"));
        assert_eq!(MENU_SHOWS.load(Ordering::SeqCst), 1);
        assert_eq!(loader.release_count("Popup.prefab"), 1);
        assert!(scene.lock().children(root).is_empty());
        assert!(director.shown_views().is_empty());
        assert!(director.modal_stack().is_empty());

        let retry = director.preload().await.unwrap_err();
        assert!(matches!(retry, DirectorError::View { .. }));
        assert_eq!(MENU_SHOWS.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_ids_are_rejected() {
        let Fixture { director, .. } = standard();
        director.preload().await.unwrap();

        assert!(matches!(
            director.show_view("Inventory").await,
            Err(DirectorError::UnknownView(_))
        ));
        assert!(matches!(
            director.hide_view("Inventory").await,
            Err(DirectorError::UnknownView(_))
        ));
        assert!(matches!(
            director.view_state("Inventory").await,
            Err(DirectorError::UnknownView(_))
        ));
    }

    //--- Show / Hide ------------------------------------------------------

    #[tokio::test]
    async fn second_show_reshows_instead_of_stacking() {
        let Fixture { director, .. } = standard();
        director.preload().await.unwrap();
        let events = director.subscribe();

        let first = director.show_view("Popup").await.unwrap();
        let second = director.show_view("Popup").await.unwrap();

        assert!(!first.is_reshow());
        assert!(second.is_reshow());
        second.wait().await.unwrap();

        assert_eq!(director.modal_stack(), vec!["Popup".to_string()]);
        assert_eq!(
            director.shown_views().iter().filter(|id| *id == "Popup").count(),
            1
        );
        let preloads = events
            .try_iter()
            .filter(|e| matches!(e, ViewEvent::Preloaded { .. }))
            .count();
        assert_eq!(preloads, 1);
    }

    #[tokio::test]
    async fn reshow_failure_is_observable() {
        let ids = ["Hud", "Shop"];
        let loader = Arc::new(
            MemoryAssetLoader::new()
                .with("Hud.prefab", prefab("Hud", ViewDescriptor::new(ViewKind::Static)))
                .with("Shop.prefab", prefab("Shop", ViewDescriptor::new(ViewKind::Static))),
        );
        let scene = SceneGraph::shared();
        let root = scene.lock().create_node("ViewRoot", None).unwrap();
        let director = DirectorBuilder::new(scene, root, CameraId(1), loader)
            .with_catalog(ViewCatalog::from_ids(ids).unwrap())
            .with_registry(
                ViewRegistry::new()
                    .with::<PlainController>("Hud")
                    .with::<FlakyController>("Shop"),
            )
            .build();
        director.preload().await.unwrap();

        let outcome = director.show_view("Shop").await.unwrap();

        match outcome {
            ShowOutcome::Reshown(task) => {
                assert_eq!(task.view_id(), "Shop");
                assert!(matches!(task.wait().await, Err(DirectorError::View { .. })));
            }
            ShowOutcome::Shown => panic!("expected a reshow"),
        }
        assert!(director.is_shown("Shop"));
    }

    #[tokio::test]
    async fn hide_of_hidden_view_is_noop() {
        let Fixture { director, loader, .. } = standard();
        director.preload().await.unwrap();
        let shown = director.shown_views();

        director.hide_view("Popup").await.unwrap();
        director.hide_view("Popup").await.unwrap();

        assert_eq!(director.shown_views(), shown);
        assert_eq!(loader.release_count("Popup.prefab"), 1);
        assert_eq!(director.view_state("Popup").await.unwrap(), ViewState::Unloaded);
    }

    #[tokio::test]
    async fn hiding_static_view_keeps_it_loaded() {
        let Fixture { director, .. } = standard();
        director.preload().await.unwrap();

        director.hide_view("Menu").await.unwrap();

        assert_eq!(director.view_state("Menu").await.unwrap(), ViewState::Hidden);
        assert!(director.view_handle("Menu").is_none());

        director.show_view("Menu").await.unwrap().wait().await.unwrap();
        assert_eq!(director.view_state("Menu").await.unwrap(), ViewState::Shown);
    }

    #[tokio::test]
    async fn modal_stack_follows_show_order() {
        let Fixture { director, .. } = standard();
        director.preload().await.unwrap();

        director.show_view("Popup").await.unwrap().wait().await.unwrap();
        director.show_view("Toast").await.unwrap().wait().await.unwrap();
        director.show_view("Dialog").await.unwrap().wait().await.unwrap();

        assert_eq!(director.modal_stack(), vec!["Popup".to_string(), "Dialog".to_string()]);

        director.hide_view("Popup").await.unwrap();
        assert_eq!(director.modal_stack(), vec!["Dialog".to_string()]);
    }

    #[tokio::test]
    async fn modal_view_renders_in_front_of_siblings() {
        let Fixture {
            director,
            scene,
            root,
            ..
        } = standard();
        director.preload().await.unwrap();

        director.show_view("Popup").await.unwrap().wait().await.unwrap();

        let popup = director.view_handle("Popup").unwrap();
        assert_eq!(scene.lock().children(root).last(), Some(&popup.node()));
        assert!(popup.canvases().iter().all(|c| c.sorting_order >= 1000));
        assert!(popup.canvases().iter().all(|c| c.camera == Some(CameraId(1))));
    }

    #[tokio::test]
    async fn modal_freezes_input_beneath_it() {
        let Fixture { director, .. } = standard();
        director.preload().await.unwrap();
        let hud = director.view_handle("Hud").unwrap();

        director.show_view("Popup").await.unwrap().wait().await.unwrap();
        let popup = director.view_handle("Popup").unwrap();
        assert!(!hud.is_input_enabled());
        assert!(popup.is_input_enabled());

        director.show_view("Dialog").await.unwrap().wait().await.unwrap();
        assert!(!popup.is_input_enabled());

        director.hide_view("Dialog").await.unwrap();
        assert!(popup.is_input_enabled());
        assert!(!hud.is_input_enabled());

        director.hide_view("Popup").await.unwrap();
        assert!(hud.is_input_enabled());
    }

    #[tokio::test]
    async fn failed_show_rolls_back_dynamic_view() {
        let ids = ["Hud", "Popup"];
        let Fixture { director, .. } = fixture(
            &ids,
            ViewRegistry::new()
                .with::<PlainController>("Hud")
                .with::<RefusingController>("Popup"),
        );
        director.preload().await.unwrap();

        let err = director.show_view("Popup").await.unwrap_err();

        assert!(matches!(err, DirectorError::View { .. }));
        assert!(!director.is_shown("Popup"));
        assert!(director.modal_stack().is_empty());
        assert_eq!(director.view_state("Popup").await.unwrap(), ViewState::Unloaded);
        assert!(director.view_handle("Hud").unwrap().is_input_enabled());
    }

    #[tokio::test]
    async fn overlapping_show_and_hide_serialize() {
        let Fixture { director, .. } = standard();
        director.preload().await.unwrap();

        let (shown, hidden) = tokio::join!(director.show_view("Popup"), director.hide_view("Popup"));

        assert!(matches!(shown, Ok(ShowOutcome::Shown)));
        assert!(hidden.is_ok());
        assert!(!director.is_shown("Popup"));
        assert_eq!(director.view_state("Popup").await.unwrap(), ViewState::Unloaded);
    }

    //--- Events / Handler / Teardown --------------------------------------

    #[tokio::test]
    async fn events_report_preload_and_dispose() {
        let Fixture { director, .. } = standard();
        let mut collector = ViewEventCollector::new(director.subscribe());

        director.preload().await.unwrap();
        collector.collect_frame();

        let events = collector.take_events();
        let preloaded = events
            .iter()
            .filter(|e| matches!(e, ViewEvent::Preloaded { .. }))
            .count();
        let disposed: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, ViewEvent::Disposed { .. }))
            .map(ViewEvent::view_id)
            .collect();
        assert_eq!(preloaded, 5);
        assert_eq!(disposed, vec!["Popup", "Dialog", "Toast"]);
    }

    #[tokio::test]
    async fn handler_drives_director_until_dropped() {
        let Fixture { director, .. } = standard();
        director.preload().await.unwrap();
        let handler = director.handler();

        handler.show_view("Toast").await.unwrap().wait().await.unwrap();
        assert!(director.is_shown("Toast"));
        handler.hide_view("Toast").await.unwrap();
        assert!(!director.is_shown("Toast"));

        drop(director);
        assert!(!handler.is_attached());
        assert!(matches!(
            handler.show_view("Toast").await,
            Err(DirectorError::DirectorDropped)
        ));
    }

    #[tokio::test]
    async fn teardown_disposes_everything_and_allows_preload_again() {
        let Fixture {
            director,
            scene,
            root,
            loader,
        } = standard();
        director.preload().await.unwrap();
        director.show_view("Popup").await.unwrap().wait().await.unwrap();
        let hud = director.view_handle("Hud").unwrap();

        director.teardown().await;

        assert!(hud.is_disposed());
        assert!(scene.lock().children(root).is_empty());
        assert!(director.shown_views().is_empty());
        assert!(director.modal_stack().is_empty());
        assert!(!director.assets().is_cached("Hud.prefab"));
        assert_eq!(loader.release_count("Hud.prefab"), 1);
        assert!(matches!(
            director.view_state("Hud").await,
            Err(DirectorError::UnknownView(_))
        ));

        director.preload().await.unwrap();
        assert!(director.is_shown("Hud"));
    }
}
