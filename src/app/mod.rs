use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use eframe::egui::{self, Color32, Context};
use tracing::{info, warn};

use docgraph::{EngineConfig, EngineServices, KnowledgeGraphEngine};

mod graph;
mod render_utils;
mod ui;

pub struct DocGraphApp {
    services: EngineServices,
    config: EngineConfig,
    corpus_label: String,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<KnowledgeGraphEngine, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    engine: KnowledgeGraphEngine,
    corpus_label: String,
    search: String,
    show_hulls: bool,
    panning: bool,
    type_colors: HashMap<String, Color32>,
    type_colors_revision: Option<u64>,
    search_match_cache: Option<SearchMatchCache>,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<String>>,
}

impl DocGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        services: EngineServices,
        config: EngineConfig,
        corpus_label: String,
    ) -> Self {
        let state = Self::start_load(services.clone(), config.clone());
        Self {
            services,
            config,
            corpus_label,
            state,
        }
    }

    fn spawn_load(
        services: EngineServices,
        config: EngineConfig,
    ) -> Receiver<Result<KnowledgeGraphEngine, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let mut engine = KnowledgeGraphEngine::new(services, config);
            let result = engine.init().map(|()| engine).map_err(|error| error.to_string());
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(services: EngineServices, config: EngineConfig) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(services, config),
        }
    }
}

impl eframe::App for DocGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(engine)) => {
                        info!(corpus = %self.corpus_label, "corpus loaded");
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(
                            engine,
                            self.corpus_label.clone(),
                        ))));
                    }
                    Ok(Err(error)) => {
                        warn!(%error, "initial load failed");
                        transition = Some(AppState::Error(error));
                    }
                    Err(mpsc::TryRecvError::Empty) => ctx.request_repaint(),
                    Err(mpsc::TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading document graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the document corpus");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition =
                            Some(Self::start_load(self.services.clone(), self.config.clone()));
                    }
                });
            }
            AppState::Ready(model) => model.show(ctx),
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
