use std::collections::HashSet;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui, vec2};

use docgraph::EngineStatus;
use docgraph::interaction::{DETAIL_UNAVAILABLE, TooltipContent};
use docgraph::util::{format_reading_time, short_title};

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, pad_polygon, segment_visible,
    with_alpha, world_to_screen,
};

const HULL_PADDING: f32 = 14.0;

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.engine.set_viewport(rect.width(), rect.height());
        draw_background(&painter, rect, self.engine.transform());

        match self.engine.status() {
            EngineStatus::Empty => {
                Self::draw_empty_state(&painter, rect, "No documents yet");
                return;
            }
            EngineStatus::Loading => {
                Self::draw_empty_state(&painter, rect, "Loading...");
                return;
            }
            EngineStatus::NoConnections | EngineStatus::Ready => {}
        }
        if self.engine.visible_graph().is_empty() {
            Self::draw_empty_state(&painter, rect, "No documents match this filter");
            return;
        }

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        let hovered = self.handle_graph_pointer(ui, rect, &response);
        let search_matches = self.search_matches();

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }
        if response.dragged() {
            ui.ctx().request_repaint();
        }

        let engine = &self.engine;
        let transform = engine.transform();
        let snapshot = engine.snapshot();
        let layout = engine.layout();
        let selected = engine.selection().selected_node_id.as_deref();
        let neighbors = selected
            .map(|id| snapshot.neighbors(id).collect::<HashSet<_>>())
            .unwrap_or_default();
        let selection_active = selected.is_some();
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());

        if self.show_hulls {
            for hull in engine.cluster_hulls() {
                let mut points = hull
                    .polygon
                    .iter()
                    .map(|&[x, y]| world_to_screen(rect, transform, vec2(x, y)))
                    .collect::<Vec<Pos2>>();
                pad_polygon(&mut points, HULL_PADDING * transform.scale.sqrt());
                let color = self.type_color(&hull.cluster_type);
                painter.add(Shape::convex_polygon(
                    points,
                    with_alpha(color, 26),
                    Stroke::new(1.0, with_alpha(color, 90)),
                ));
            }
        }

        let zoom_sqrt = transform.scale.sqrt();
        for edge in engine.visible_graph().edges(snapshot) {
            let (Some(source), Some(target)) =
                (layout.position(&edge.source), layout.position(&edge.target))
            else {
                continue;
            };
            let start = world_to_screen(rect, transform, source);
            let end = world_to_screen(rect, transform, target);
            if !segment_visible(rect, start, end, 2.0) {
                continue;
            }

            let highlighted = selected.is_some_and(|id| edge.touches(id))
                || hovered.as_deref().is_some_and(|id| edge.touches(id));
            let width = ((0.6 + edge.weight * 2.2) * zoom_sqrt).clamp(0.5, 5.0);
            let color = if highlighted {
                Color32::from_rgb(241, 146, 94)
            } else if selection_active {
                Color32::from_rgba_unmultiplied(80, 90, 104, 120)
            } else {
                Color32::from_rgba_unmultiplied(120, 128, 140, 170)
            };
            painter.line_segment([start, end], Stroke::new(width, color));
        }

        let selected_color = Color32::from_rgb(245, 206, 93);
        let mut selection_animating = false;
        for body in layout.bodies() {
            let position = world_to_screen(rect, transform, body.position);
            let radius = (body.radius * transform.scale).max(2.0);
            if !circle_visible(rect, position, radius) {
                continue;
            }
            let Some(node) = snapshot.node(body.id) else {
                continue;
            };

            let is_selected = selected == Some(body.id);
            let is_hovered = hovered.as_deref() == Some(body.id);
            let is_neighbor = neighbors.contains(body.id);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(body.id));

            let base_color = self.type_color(&node.node_type);
            let unselected_color = if is_hovered {
                blend_color(base_color, Color32::WHITE, 0.35)
            } else if is_neighbor {
                blend_color(base_color, Color32::from_rgb(246, 137, 92), 0.45)
            } else if is_match {
                blend_color(base_color, Color32::from_rgb(103, 196, 255), 0.68)
            } else if selection_active && !is_selected {
                dim_color(base_color, 0.52)
            } else if search_active {
                dim_color(base_color, 0.38)
            } else {
                base_color
            };

            let selection_mix = ui.ctx().animate_bool(
                ui.make_persistent_id(("node-selection", body.id)),
                is_selected,
            );
            if selection_mix > 0.0 && selection_mix < 1.0 {
                selection_animating = true;
            }
            let color = blend_color(unselected_color, selected_color, selection_mix);

            painter.circle_filled(position, radius, color);
            if selection_mix > 0.0 {
                painter.circle_stroke(
                    position,
                    radius + 4.0 + ((1.0 - selection_mix) * 6.0),
                    Stroke::new(1.6, with_alpha(selected_color, (selection_mix * 175.0) as u8)),
                );
            }
            let stroke_width = if body.pinned { 2.0 } else { 1.0 };
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(stroke_width, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            );

            let draw_label = is_selected
                || is_hovered
                || is_neighbor
                || is_match
                || transform.scale > 1.2;
            if draw_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    short_title(&node.title, 32),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if selection_animating {
            ui.ctx().request_repaint();
        }

        if engine.status() == EngineStatus::NoConnections {
            painter.text(
                rect.center_bottom() - vec2(0.0, 24.0),
                Align2::CENTER_BOTTOM,
                "No connections yet",
                FontId::proportional(15.0),
                Color32::from_gray(170),
            );
        }

        self.draw_tooltip(&painter, rect);
    }

    fn draw_tooltip(&self, painter: &egui::Painter, rect: Rect) {
        let Some(tooltip) = self.engine.tooltip() else {
            return;
        };
        let Some(node) = self.engine.snapshot().node(&tooltip.node_id) else {
            return;
        };
        let Some(position) = self.engine.layout().position(&tooltip.node_id) else {
            return;
        };

        let mut lines = vec![node.title.clone()];
        if !node.node_type.is_empty() {
            lines.push(node.node_type.clone());
        }
        match &tooltip.content {
            TooltipContent::Loading => lines.push("Loading...".to_owned()),
            TooltipContent::Detail(detail) => {
                lines.push(format_reading_time(detail.reading_time));
                lines.push(format!("{} connections", detail.connection_count));
            }
            TooltipContent::Unavailable => lines.push(DETAIL_UNAVAILABLE.to_owned()),
        }

        let transform = self.engine.transform();
        let anchor = world_to_screen(rect, transform, position)
            + vec2(node.visual_size() * transform.scale + 10.0, 10.0);
        let galley = painter.layout_no_wrap(
            lines.join("\n"),
            FontId::proportional(13.0),
            Color32::from_gray(240),
        );
        let frame = Rect::from_min_size(anchor, galley.size() + vec2(16.0, 12.0));
        painter.rect_filled(frame, 6.0, Color32::from_rgba_unmultiplied(28, 32, 40, 235));
        painter.galley(anchor + vec2(8.0, 6.0), galley, Color32::from_gray(240));
    }

    fn draw_empty_state(painter: &egui::Painter, rect: Rect, message: &str) {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            message,
            FontId::proportional(18.0),
            Color32::from_gray(190),
        );
    }
}
