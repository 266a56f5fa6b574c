mod services;

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use eframe::egui::{Vec2, vec2};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::corpus::{DocumentSummary, NodeDetail};
use crate::error::{CorpusError, DetailError, EngineError};
use crate::graph::{GraphBuilder, GraphSnapshot, NodeId};
use crate::interaction::{
    Effect, HoverState, InteractionController, InteractionEvent, InteractionPhase, RequestKind,
    RequestToken, SelectionState, Tooltip, TypeFilter, ViewTransform, VisibleGraph,
};
use crate::layout::{ClusterHull, LayoutEngine, PositionMap};
pub use services::EngineServices;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    Loading,
    /// Loaded, but the corpus has no documents.
    Empty,
    /// Documents exist but none reference each other.
    NoConnections,
    Ready,
}

struct FetchOutcome {
    node_id: NodeId,
    token: RequestToken,
    result: Result<NodeDetail, DetailError>,
}

type ReloadResult = Result<Vec<DocumentSummary>, CorpusError>;

/// Owns the graph, the simulation and the interaction state for one host.
pub struct KnowledgeGraphEngine {
    services: EngineServices,
    config: EngineConfig,
    builder: GraphBuilder,
    snapshot: GraphSnapshot,
    revision: u64,
    loaded: bool,
    filter: TypeFilter,
    visible: VisibleGraph,
    layout: LayoutEngine,
    controller: InteractionController,
    transform: ViewTransform,
    fetch_tx: Option<Sender<FetchOutcome>>,
    fetch_rx: Option<Receiver<FetchOutcome>>,
    reload_rx: Option<Receiver<ReloadResult>>,
    last_refresh_error: Option<String>,
    disposed: bool,
}

impl KnowledgeGraphEngine {
    pub fn new(services: EngineServices, config: EngineConfig) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::channel();
        Self {
            builder: GraphBuilder::new(config.builder.clone(), config.clusters),
            layout: LayoutEngine::new(config.layout.clone()),
            services,
            config,
            snapshot: GraphSnapshot::default(),
            revision: 0,
            loaded: false,
            filter: TypeFilter::All,
            visible: VisibleGraph::default(),
            controller: InteractionController::new(),
            transform: ViewTransform::default(),
            fetch_tx: Some(fetch_tx),
            fetch_rx: Some(fetch_rx),
            reload_rx: None,
            last_refresh_error: None,
            disposed: false,
        }
    }

    /// Blocking initial load from the corpus source.
    pub fn init(&mut self) -> Result<(), EngineError> {
        if self.disposed {
            return Err(EngineError::Disposed);
        }

        let documents = self.services.corpus.fetch_corpus()?;
        self.install(&documents);
        Ok(())
    }

    /// Rebuilds synchronously from an in-memory corpus.
    pub fn load_corpus(&mut self, corpus: &[DocumentSummary]) {
        if self.disposed {
            return;
        }
        self.install(corpus);
    }

    /// Starts a background reload. Returns `false` when one is already running.
    pub fn refresh(&mut self) -> bool {
        if self.disposed || self.reload_rx.is_some() {
            return false;
        }

        let corpus = Arc::clone(&self.services.corpus);
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(corpus.fetch_corpus());
        });
        self.reload_rx = Some(rx);
        debug!("refresh started");
        true
    }

    pub fn is_refreshing(&self) -> bool {
        self.reload_rx.is_some()
    }

    pub fn last_refresh_error(&self) -> Option<&str> {
        self.last_refresh_error.as_deref()
    }

    /// Blocks until the running refresh finishes and applies it.
    pub fn wait_for_refresh(&mut self, timeout: Duration) -> bool {
        let Some(rx) = self.reload_rx.take() else {
            return false;
        };

        match rx.recv_timeout(timeout) {
            Ok(result) => {
                self.apply_reload(result);
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                self.reload_rx = Some(rx);
                false
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!("refresh worker exited without a result");
                false
            }
        }
    }

    /// Invalidates every outstanding request and stops accepting work.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        self.controller.reset();
        self.fetch_tx = None;
        self.fetch_rx = None;
        self.reload_rx = None;
        self.disposed = true;
        info!("engine disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn install(&mut self, documents: &[DocumentSummary]) {
        let first_load = !self.loaded;
        self.snapshot = self.builder.build(documents);
        self.revision += 1;
        self.loaded = true;
        self.visible = self.filter.apply(&self.snapshot);
        self.layout.sync(&self.snapshot, &self.visible);

        let effects = self
            .controller
            .retain_known(|id| self.snapshot.contains(id));
        self.apply_effects(effects);

        if !first_load {
            self.layout.reheat();
        }

        info!(
            nodes = self.snapshot.node_count(),
            edges = self.snapshot.edge_count(),
            clusters = self.snapshot.clusters().len(),
            "graph installed"
        );
    }

    fn apply_reload(&mut self, result: ReloadResult) {
        match result {
            Ok(documents) => {
                self.last_refresh_error = None;
                self.install(&documents);
            }
            Err(err) => {
                warn!(error = %err, "refresh failed, keeping current graph");
                self.last_refresh_error = Some(err.to_string());
            }
        }
    }

    /// Applies finished fetches and refreshes. Returns whether state changed.
    pub fn poll(&mut self) -> bool {
        if self.disposed {
            return false;
        }

        let mut changed = false;
        while let Some(outcome) = self
            .fetch_rx
            .as_ref()
            .and_then(|rx| rx.try_recv().ok())
        {
            self.apply_fetch(outcome);
            changed = true;
        }

        if let Some(rx) = &self.reload_rx {
            match rx.try_recv() {
                Ok(result) => {
                    self.reload_rx = None;
                    self.apply_reload(result);
                    changed = true;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    warn!("refresh worker exited without a result");
                    self.reload_rx = None;
                }
            }
        }

        changed
    }

    /// Blocks until one fetch result arrives and applies it.
    pub fn wait_for_fetch(&mut self, timeout: Duration) -> bool {
        let outcome = match self.fetch_rx.as_ref() {
            Some(rx) => rx.recv_timeout(timeout).ok(),
            None => None,
        };

        match outcome {
            Some(outcome) => {
                self.apply_fetch(outcome);
                true
            }
            None => false,
        }
    }

    /// One frame: apply background results, then one simulation step.
    /// Returns whether the host should keep repainting.
    pub fn tick(&mut self) -> bool {
        if self.disposed {
            return false;
        }

        let changed = self.poll();
        let active = self.layout.tick();
        changed || active
    }

    fn apply_fetch(&mut self, outcome: FetchOutcome) {
        let FetchOutcome {
            node_id,
            token,
            result,
        } = outcome;
        let event = match token.kind() {
            RequestKind::Selection => InteractionEvent::DetailResolved {
                node_id,
                token,
                result,
            },
            RequestKind::Hover => InteractionEvent::TooltipResolved {
                node_id,
                token,
                result,
            },
        };
        self.dispatch(event);
    }

    fn dispatch(&mut self, event: InteractionEvent) {
        if self.disposed {
            return;
        }
        let effects = self.controller.handle(event);
        self.apply_effects(effects);
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchDetail { node_id, token } | Effect::FetchTooltip { node_id, token } => {
                    self.spawn_fetch(node_id, token);
                }
                Effect::OpenDocument(node_id) => self.services.opener.open_document(&node_id),
                Effect::Pin { node_id, position } => {
                    if self.layout.pin(&node_id, position) {
                        self.layout.hold_warm(true);
                    }
                }
                Effect::Unpin(node_id) => {
                    self.layout.unpin(&node_id);
                    self.layout.hold_warm(false);
                }
                Effect::Reheat => self.layout.reheat(),
            }
        }
    }

    fn spawn_fetch(&self, node_id: NodeId, token: RequestToken) {
        let Some(tx) = self.fetch_tx.clone() else {
            return;
        };

        let details = Arc::clone(&self.services.details);
        thread::spawn(move || {
            let result = details.fetch_node_detail(&node_id);
            // The engine may have been disposed meanwhile.
            let _ = tx.send(FetchOutcome {
                node_id,
                token,
                result,
            });
        });
    }

    fn knows(&self, id: &str) -> bool {
        let known = self.snapshot.contains(id);
        if !known {
            debug!(node = %id, "ignoring event for unknown node");
        }
        known
    }

    pub fn on_node_click(&mut self, id: &str) {
        if self.knows(id) {
            self.dispatch(InteractionEvent::Click(id.to_owned()));
        }
    }

    pub fn on_node_double_click(&mut self, id: &str) {
        if self.knows(id) {
            self.dispatch(InteractionEvent::DoubleClick(id.to_owned()));
        }
    }

    /// `None` ends the current hover.
    pub fn on_node_hover(&mut self, id: Option<&str>) {
        match id {
            Some(id) if self.knows(id) => self.dispatch(InteractionEvent::HoverEnter(id.to_owned())),
            Some(_) => {}
            None => {
                if self.controller.hover().is_hovering() {
                    self.dispatch(InteractionEvent::HoverLeave);
                }
            }
        }
    }

    pub fn on_background_click(&mut self) {
        self.dispatch(InteractionEvent::BackgroundClick);
    }

    pub fn clear_selection(&mut self) {
        self.dispatch(InteractionEvent::ClearSelection);
    }

    /// `world` is the pointer position in layout coordinates.
    pub fn begin_drag(&mut self, id: &str, world: Vec2) {
        if self.knows(id) && self.layout.contains(id) {
            self.dispatch(InteractionEvent::DragStart {
                node_id: id.to_owned(),
                position: world,
            });
        }
    }

    pub fn drag_to(&mut self, world: Vec2) {
        self.dispatch(InteractionEvent::DragMove(world));
    }

    pub fn end_drag(&mut self) {
        self.dispatch(InteractionEvent::DragEnd);
    }

    pub fn set_type_filter(&mut self, filter: impl Into<TypeFilter>) {
        let filter = filter.into();
        if self.disposed || filter == self.filter {
            return;
        }

        self.filter = filter;
        self.visible = self.filter.apply(&self.snapshot);
        self.layout.sync(&self.snapshot, &self.visible);

        let dragged_hidden = self
            .controller
            .drag()
            .is_some_and(|drag| !self.layout.contains(&drag.node_id));
        if dragged_hidden {
            self.dispatch(InteractionEvent::DragEnd);
        }
        let hovered_hidden = self
            .controller
            .hover()
            .hovered_node_id
            .as_deref()
            .is_some_and(|id| !self.layout.contains(id));
        if hovered_hidden {
            self.dispatch(InteractionEvent::HoverLeave);
        }

        self.layout.reheat();
        debug!(filter = %self.filter, visible = self.visible.node_count(), "type filter changed");
    }

    pub fn type_filter(&self) -> &TypeFilter {
        &self.filter
    }

    fn viewport(&self) -> Vec2 {
        let params = self.layout.params();
        vec2(params.viewport_width, params.viewport_height)
    }

    /// Resizes the canvas; the centering force follows its middle.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let current = self.viewport();
        if current.x != width || current.y != height {
            self.layout.set_viewport(width, height);
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        let viewport = self.viewport();
        self.transform.zoom_in(viewport, &self.config.zoom)
    }

    pub fn zoom_out(&mut self) -> bool {
        let viewport = self.viewport();
        self.transform.zoom_out(viewport, &self.config.zoom)
    }

    /// Gesture zoom around `anchor` in canvas-local screen coordinates.
    pub fn zoom_at(&mut self, factor: f32, anchor: Vec2) -> bool {
        self.transform.zoom_by(factor, anchor, &self.config.zoom)
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.transform.pan_by(delta);
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Hit-test in canvas-local screen coordinates.
    pub fn node_at_screen(&self, screen: Vec2) -> Option<&str> {
        self.layout.node_at(self.transform.screen_to_world(screen))
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    /// Bumped every time a new snapshot is installed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn visible_graph(&self) -> &VisibleGraph {
        &self.visible
    }

    pub fn positions(&self) -> PositionMap {
        self.layout.positions()
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn selection(&self) -> &SelectionState {
        self.controller.selection()
    }

    pub fn hover(&self) -> &HoverState {
        self.controller.hover()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.controller.tooltip()
    }

    pub fn phase(&self) -> InteractionPhase {
        self.controller.phase()
    }

    pub fn cluster_hulls(&self) -> &[ClusterHull] {
        self.layout.hulls()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn status(&self) -> EngineStatus {
        if !self.loaded {
            EngineStatus::Loading
        } else if self.snapshot.is_empty() {
            EngineStatus::Empty
        } else if !self.snapshot.has_connections() {
            EngineStatus::NoConnections
        } else {
            EngineStatus::Ready
        }
    }
}

impl Drop for KnowledgeGraphEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}
