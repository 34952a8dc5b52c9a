use eframe::egui::{self, Color32, Ui};

use collab_graph::collab::MAX_EGO_DEGREE;
use collab_graph::{LayoutKind, ShrinkMethod};

use super::super::{ViewMode, ViewModel};

const MAX_VERTEX_LIMIT: i64 = 500;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        let full_mode = self.mode == ViewMode::Full;
        let mut regenerate = false;

        let limit_slider = ui
            .add(
                egui::Slider::new(&mut self.config.vertex_limit, 1..=MAX_VERTEX_LIMIT)
                    .text("Vertex limit"),
            )
            .on_hover_text("Keep at most this many artists in the generated graph.");
        regenerate |=
            limit_slider.drag_stopped() || (limit_slider.changed() && !limit_slider.dragged());

        ui.label("Shrink method");
        ui.horizontal_wrapped(|ui| {
            for method in ShrinkMethod::ALL {
                regenerate |= ui
                    .selectable_value(&mut self.config.shrink_method, method, method.label())
                    .changed();
            }
        });

        ui.separator();

        ui.label("Layout");
        ui.horizontal_wrapped(|ui| {
            for layout in LayoutKind::ALL {
                self.layout_dirty |= ui
                    .selectable_value(&mut self.config.layout, layout, layout.label())
                    .on_hover_text(layout_hint(layout))
                    .changed();
            }
        });

        ui.checkbox(&mut self.config.show_labels, "Show labels");
        ui.checkbox(&mut self.config.show_weights, "Show weights")
            .on_hover_text("Label each edge with its collaboration count.");
        self.layout_dirty |= ui
            .checkbox(&mut self.config.dynamic_mode, "Dynamic mode")
            .on_hover_text("Keep the simulation gently moving instead of letting it settle.")
            .changed();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(full_mode, egui::Button::new("Regenerate"))
                .clicked()
            {
                regenerate = true;
            }
            if ui.button("Restart layout").clicked() {
                self.layout_dirty = true;
            }
        });

        if let Some(outcome) = self.last_outcome {
            ui.small(format!("cache: {}", outcome.label()));
        }

        if regenerate && full_mode {
            self.graph_dirty = true;
        }

        ui.separator();
        ui.heading("Ego network");
        ui.add_space(4.0);

        ui.add(
            egui::Slider::new(&mut self.ego_degree, 1..=MAX_EGO_DEGREE)
                .text("Degrees of separation"),
        );

        ui.label("Search artist");
        let search_response = ui.text_edit_singleline(&mut self.search);
        if search_response.changed() {
            self.search_results = self.service.dataset().search(&self.search);
        }

        let mut chosen = None;
        egui::ScrollArea::vertical()
            .max_height(220.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for name in &self.search_results {
                    let is_focus =
                        matches!(&self.mode, ViewMode::Ego { artist, .. } if artist == name);
                    if ui.selectable_label(is_focus, name).clicked() {
                        chosen = Some(name.clone());
                    }
                }
            });
        if let Some(artist) = chosen {
            self.request_ego(artist);
        }

        let can_return = !full_mode || self.ego_requests.is_pending();
        if ui
            .add_enabled(can_return, egui::Button::new("Full graph"))
            .clicked()
        {
            self.show_full_graph();
        }

        if let Some(status) = &self.status {
            ui.separator();
            ui.colored_label(Color32::from_rgb(236, 150, 110), status);
        }
    }
}

fn layout_hint(layout: LayoutKind) -> &'static str {
    match layout {
        LayoutKind::Spring => "Balanced force-directed layout.",
        LayoutKind::Circular => "Every artist pinned on one circle.",
        LayoutKind::Shell => "Three pinned rings, most collaborative innermost.",
        LayoutKind::Random => "Random start, then free to move.",
        LayoutKind::KamadaKawai => "Stronger links, compact result.",
        LayoutKind::FruchtermanReingold => "Stronger repulsion, spread-out result.",
    }
}
