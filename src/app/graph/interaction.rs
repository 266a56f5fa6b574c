use eframe::egui::{self, Rect, Ui};

use docgraph::interaction::InteractionPhase;

use super::super::ViewModel;
use super::super::render_utils::to_local;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.engine.zoom_at(zoom_factor, to_local(rect, pointer));
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
            || (self.panning && response.dragged_by(egui::PointerButton::Primary))
        {
            self.engine.pan_by(response.drag_delta());
        }
    }

    /// Hover, click, double-click and node dragging. Returns the hovered id.
    pub(in crate::app) fn handle_graph_pointer(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) -> Option<String> {
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .map(|pointer| to_local(rect, pointer));
        let dragging = self.engine.phase() == InteractionPhase::Dragging;

        let hovered = if dragging {
            self.engine.hover().hovered_node_id.clone()
        } else {
            pointer.and_then(|local| self.engine.node_at_screen(local).map(str::to_owned))
        };
        if !dragging {
            self.engine.on_node_hover(hovered.as_deref());
        }

        if response.drag_started_by(egui::PointerButton::Primary) {
            let press = ui
                .input(|input| input.pointer.press_origin())
                .map(|origin| to_local(rect, origin));
            let target = press.and_then(|local| {
                self.engine
                    .node_at_screen(local)
                    .map(|id| (id.to_owned(), self.engine.transform().screen_to_world(local)))
            });
            match target {
                Some((id, world)) => self.engine.begin_drag(&id, world),
                None => self.panning = true,
            }
        }

        if self.engine.phase() == InteractionPhase::Dragging
            && response.dragged_by(egui::PointerButton::Primary)
            && let Some(local) = ui
                .input(|input| input.pointer.interact_pos())
                .map(|pointer| to_local(rect, pointer))
        {
            let world = self.engine.transform().screen_to_world(local);
            self.engine.drag_to(world);
        }

        if response.drag_stopped() {
            if self.engine.phase() == InteractionPhase::Dragging {
                self.engine.end_drag();
            }
            self.panning = false;
        }

        if response.double_clicked_by(egui::PointerButton::Primary) {
            if let Some(id) = hovered.as_deref() {
                self.engine.on_node_double_click(id);
            }
        } else if response.clicked_by(egui::PointerButton::Primary) {
            match hovered.as_deref() {
                Some(id) => self.engine.on_node_click(id),
                None => self.engine.on_background_click(),
            }
        }

        hovered
    }
}
