use eframe::egui::{
    self, Align2, Color32, FontId, PointerButton, Rect, Sense, Stroke, Ui, vec2,
};
use tracing::warn;

use collab_graph::layout::{LayoutSnapshot, Viewport};
use collab_graph::util::short_label;

use super::super::render_utils::{
    blend_color, circle_visible, degree_color, draw_background, edge_visible, edge_width,
    hop_color,
};
use super::super::{ViewMode, ViewModel};

const LABEL_MAX_CHARS: usize = 28;

impl ViewModel {
    fn sync_session(&mut self, rect: Rect) {
        let Ok(viewport) = Viewport::new(rect.width(), rect.height()) else {
            return;
        };

        if self.layout_dirty {
            self.layout_dirty = false;
            self.viewport = Some(viewport);
            let Some(graph) = &self.graph else {
                self.surface.end();
                return;
            };
            if let Err(error) = self.surface.begin(graph, &self.config, viewport) {
                warn!(%error, "could not start layout session");
                self.status = Some(error.to_string());
            }
            return;
        }

        if self.viewport != Some(viewport) {
            self.viewport = Some(viewport);
            if let Err(error) = self.surface.resize(viewport) {
                warn!(%error, "could not resize layout session");
            }
        }
    }

    fn handle_pointer(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if response.drag_started_by(PointerButton::Primary)
            && let Some(origin) = ui
                .input(|input| input.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos())
        {
            self.surface.pointer_down(rect, origin);
        }

        if response.dragged_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.surface.pointer_move(rect, pointer);
        }

        if response.drag_stopped_by(PointerButton::Primary) {
            self.surface.pointer_up();
        }

        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                let pointer = ui
                    .input(|input| input.pointer.hover_pos())
                    .unwrap_or_else(|| rect.center());
                self.surface.scroll(rect, pointer, scroll);
            }
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.sync_session(rect);
        self.handle_pointer(ui, rect, &response);

        let transform = self.surface.interaction().transform();
        draw_background(&painter, rect, transform.pan, transform.zoom());

        if let Err(error) = self.surface.step(1) {
            warn!(%error, "layout step failed");
        }

        let Some(snapshot) = self.surface.snapshot() else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No graph to show yet.",
                FontId::proportional(15.0),
                Color32::from_gray(200),
            );
            return;
        };

        let settled = self.surface.engine().is_none_or(|engine| engine.is_settled());
        if !settled || self.surface.interaction().is_dragging() {
            ui.ctx().request_repaint();
        }

        let hovered = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .and_then(|pointer| self.surface.interaction().hit_test(&snapshot, rect, pointer));
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        self.paint_snapshot(&painter, rect, &snapshot, hovered);

        if let Some(index) = hovered {
            let node = &snapshot.nodes[index];
            let mut text = format!("{}  |  degree {}", snapshot.names[index], node.degree);
            if let Some(distance) = node.distance {
                text.push_str(&format!("  |  {distance} hops"));
            }
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );

            if response.double_clicked() {
                self.request_ego(snapshot.ids[index].clone());
            }
        }
    }

    fn paint_snapshot(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        snapshot: &LayoutSnapshot,
        hovered: Option<usize>,
    ) {
        let transform = self.surface.interaction().transform();
        let zoom = transform.zoom();
        let screen = snapshot
            .nodes
            .iter()
            .map(|node| transform.world_to_screen(rect, node.position))
            .collect::<Vec<_>>();

        for edge in snapshot.edges.iter() {
            let start = screen[edge.source];
            let end = screen[edge.target];
            if !edge_visible(rect, start, end, 2.0) {
                continue;
            }
            let touches_hover =
                hovered.is_some_and(|index| index == edge.source || index == edge.target);
            let color = if touches_hover {
                Color32::from_rgb(241, 146, 94)
            } else {
                Color32::from_rgba_unmultiplied(110, 110, 120, 170)
            };
            painter.line_segment([start, end], Stroke::new(edge_width(edge.weight, zoom), color));

            if self.config.show_weights {
                painter.text(
                    start + (end - start) * 0.5,
                    Align2::CENTER_CENTER,
                    edge.weight.to_string(),
                    FontId::proportional(10.0),
                    Color32::from_gray(190),
                );
            }
        }

        let (min_degree, max_degree) = snapshot
            .nodes
            .iter()
            .fold((u64::MAX, 0), |(lo, hi), node| (lo.min(node.degree), hi.max(node.degree)));
        let ego_mode = matches!(self.mode, ViewMode::Ego { .. });

        for (index, node) in snapshot.nodes.iter().enumerate() {
            let position = screen[index];
            let radius = node.radius * zoom;
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let base = match node.distance {
                Some(distance) if ego_mode => hop_color(distance),
                _ => degree_color(node.degree, min_degree, max_degree),
            };
            let color = if hovered == Some(index) {
                blend_color(base, Color32::from_rgb(255, 164, 101), 0.7)
            } else {
                base
            };

            painter.circle_filled(position, radius, color);
            if node.special {
                painter.circle_stroke(
                    position,
                    radius + 3.0,
                    Stroke::new(2.5, Color32::from_rgb(245, 206, 93)),
                );
            }
            let outline = if node.pinned {
                Stroke::new(1.4, Color32::from_gray(230))
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
            };
            painter.circle_stroke(position, radius, outline);

            if self.config.show_labels || node.special || hovered == Some(index) {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    short_label(&snapshot.names[index], LABEL_MAX_CHARS),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }
    }
}
