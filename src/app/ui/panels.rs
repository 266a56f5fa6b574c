use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use eframe::egui::{self, Align, Color32, Context, Layout};

use docgraph::interaction::TypeFilter;
use docgraph::{EngineStatus, KnowledgeGraphEngine};

use super::super::render_utils::{hashed_color, palette_color};
use super::super::{SearchMatchCache, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(engine: KnowledgeGraphEngine, corpus_label: String) -> Self {
        Self {
            engine,
            corpus_label,
            search: String::new(),
            show_hulls: true,
            panning: false,
            type_colors: HashMap::new(),
            type_colors_revision: None,
            search_match_cache: None,
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        if self.engine.tick() || self.engine.is_refreshing() || self.fetch_outstanding() {
            ctx.request_repaint();
        }
        self.refresh_type_colors();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }

    fn fetch_outstanding(&self) -> bool {
        self.engine.selection().is_loading() || self.engine.hover().request.is_some()
    }

    fn draw_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("docgraph");
            ui.separator();
            ui.label(format!("corpus: {}", self.corpus_label));

            let snapshot = self.engine.snapshot();
            let visible = self.engine.visible_graph();
            ui.label(format!(
                "nodes: {}/{}",
                visible.node_count(),
                snapshot.node_count()
            ));
            ui.label(format!(
                "edges: {}/{}",
                visible.edge_count(),
                snapshot.edge_count()
            ));

            let refreshing = self.engine.is_refreshing();
            if ui
                .add_enabled(!refreshing, egui::Button::new("Refresh"))
                .clicked()
            {
                self.engine.refresh();
            }
            if ui.button("Zoom in").clicked() {
                self.engine.zoom_in();
            }
            if ui.button("Zoom out").clicked() {
                self.engine.zoom_out();
            }
            ui.label(format!("{:.0}%", self.engine.transform().scale * 100.0));

            self.draw_type_filter(ui);
            ui.checkbox(&mut self.show_hulls, "Hulls");
            ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("Search titles")
                    .desired_width(180.0),
            );

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if refreshing {
                    ui.spinner();
                } else if let Some(error) = self.engine.last_refresh_error() {
                    ui.colored_label(Color32::from_rgb(232, 110, 96), "refresh failed")
                        .on_hover_text(error);
                }
                let status = match self.engine.status() {
                    EngineStatus::Loading => "loading",
                    EngineStatus::Empty => "empty",
                    EngineStatus::NoConnections => "no connections",
                    EngineStatus::Ready => "ready",
                };
                ui.label(status);
            });
        });
    }

    fn draw_type_filter(&mut self, ui: &mut egui::Ui) {
        let current = self.engine.type_filter().clone();
        let mut selected = current.clone();
        let types = self
            .engine
            .snapshot()
            .node_types()
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();

        egui::ComboBox::from_id_salt("type_filter")
            .selected_text(format!("type: {current}"))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut selected, TypeFilter::All, "all");
                for node_type in types {
                    let label = node_type.clone();
                    ui.selectable_value(&mut selected, TypeFilter::Only(node_type), label);
                }
            });

        if selected != current {
            self.engine.set_type_filter(selected);
        }
    }

    fn refresh_type_colors(&mut self) {
        let revision = self.engine.revision();
        if self.type_colors_revision == Some(revision) {
            return;
        }

        self.type_colors = self
            .engine
            .snapshot()
            .node_types()
            .into_iter()
            .enumerate()
            .map(|(index, node_type)| (node_type.to_owned(), palette_color(index)))
            .collect();
        self.type_colors_revision = Some(revision);
    }

    pub(in crate::app) fn type_color(&self, key: &str) -> Color32 {
        self.type_colors
            .get(key)
            .copied()
            .unwrap_or_else(|| hashed_color(key))
    }

    pub(in crate::app) fn search_matches(&mut self) -> Option<Arc<HashSet<String>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let revision = self.engine.revision();
        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matches = self
            .engine
            .snapshot()
            .search_titles(query)
            .into_iter()
            .map(|node| node.id.clone())
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }
}
