use eframe::egui::{self, RichText, Ui};

use docgraph::interaction::DETAIL_UNAVAILABLE;
use docgraph::util::{format_reading_time, short_title};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let selection = self.engine.selection().clone();
        let Some(selected_id) = selection.selected_node_id.clone() else {
            ui.label("Click a node to see its details.");
            return;
        };

        let Some(node) = self.engine.snapshot().node(&selected_id).cloned() else {
            ui.label("Selected node no longer exists in the graph.");
            return;
        };

        ui.label(RichText::new(node.title.as_str()).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        ui.label(format!("Type: {}", node.node_type));
        if !node.tags.is_empty() {
            let tags = node.tags.iter().map(String::as_str).collect::<Vec<_>>();
            ui.label(format!("Tags: {}", tags.join(", ")));
        }
        ui.label(format!("Words: {}", node.word_count));
        if !node.concepts.is_empty() {
            ui.label(format!("Concepts: {}", node.concepts.join(", ")));
        }

        ui.separator();
        if selection.is_loading() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading details...");
            });
        } else if let Some(detail) = &selection.detail {
            ui.label(format!("Reading time: {}", format_reading_time(detail.reading_time)));
            ui.label(format!("Connections: {}", detail.connection_count));
        } else if selection.detail_error.is_some() {
            ui.label(RichText::new(DETAIL_UNAVAILABLE).italics());
        }

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui.button("Open document").clicked() {
                self.engine.on_node_double_click(&selected_id);
            }
            if ui.button("Clear selection").clicked() {
                self.engine.clear_selection();
            }
        });

        ui.separator();
        ui.label(RichText::new("Linked documents").strong());
        let snapshot = self.engine.snapshot();
        let mut linked = snapshot
            .neighbors(&selected_id)
            .filter_map(|id| snapshot.node(id))
            .map(|neighbor| (neighbor.id.clone(), neighbor.title.clone()))
            .collect::<Vec<_>>();
        linked.sort_by(|a, b| a.1.cmp(&b.1));

        if linked.is_empty() {
            ui.label("No linked documents.");
            return;
        }

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("linked_documents_scroll")
            .max_height(320.0)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (id, title) in &linked {
                    if ui
                        .link(short_title(title, 40))
                        .on_hover_text(title.as_str())
                        .clicked()
                    {
                        clicked = Some(id.clone());
                    }
                }
            });

        if let Some(id) = clicked {
            self.engine.on_node_click(&id);
        }
    }
}
