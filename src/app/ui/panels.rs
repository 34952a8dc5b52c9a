use std::sync::Arc;

use eframe::egui::{self, Align, Context, Layout};
use tracing::warn;

use collab_graph::Configuration;
use collab_graph::layout::LayoutSurface;
use collab_graph::service::{EgoRequests, GraphService};

use super::super::{ViewMode, ViewModel};

impl ViewModel {
    pub(in crate::app) const DEFAULT_EGO_DEGREE: u32 = 2;

    pub(in crate::app) fn new(service: GraphService) -> Self {
        let ego_requests = EgoRequests::new(Arc::clone(service.dataset()));
        Self {
            service,
            config: Configuration::default(),
            mode: ViewMode::Full,
            graph: None,
            surface: LayoutSurface::new(),
            ego_requests,
            ego_degree: Self::DEFAULT_EGO_DEGREE,
            search: String::new(),
            search_results: Vec::new(),
            last_outcome: None,
            status: None,
            graph_dirty: true,
            layout_dirty: false,
            viewport: None,
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, data_dir: &str) {
        self.poll_ego();
        if self.graph_dirty {
            self.regenerate();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("collab-graph");
                    ui.separator();
                    ui.label(format!("data: {data_dir}"));
                    let dataset = self.service.dataset().graph();
                    ui.label(format!("artists: {}", dataset.node_count()));
                    ui.label(format!("collaborations: {}", dataset.edge_count()));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.mode_text());
                        if let Some(graph) = &self.graph {
                            ui.label(format!(
                                "showing {} nodes / {} edges",
                                graph.node_count(),
                                graph.edge_count()
                            ));
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));

        if self.ego_requests.is_pending() {
            ctx.request_repaint();
        }
    }

    fn mode_text(&self) -> String {
        match &self.mode {
            ViewMode::Full => "full graph".to_owned(),
            ViewMode::Ego { artist, degree } => format!("ego network: {artist} ({degree} hops)"),
        }
    }

    fn regenerate(&mut self) {
        self.graph_dirty = false;
        match self.service.generate(&self.config) {
            Ok(generated) => {
                self.last_outcome = Some(generated.outcome);
                self.graph = Some(generated.graph);
                self.mode = ViewMode::Full;
                self.layout_dirty = true;
                self.status = None;
            }
            Err(error) => {
                warn!(%error, "graph generation failed");
                self.status = Some(error.to_string());
            }
        }
    }

    pub(in crate::app) fn request_ego(&mut self, artist: String) {
        self.status = Some(format!("Loading ego network for {artist}..."));
        self.ego_requests.submit(artist, self.ego_degree);
    }

    pub(in crate::app) fn show_full_graph(&mut self) {
        self.ego_requests.cancel();
        self.graph_dirty = true;
    }

    fn poll_ego(&mut self) {
        let Some(result) = self.ego_requests.poll() else {
            return;
        };

        match result {
            Ok(response) => {
                self.mode = ViewMode::Ego {
                    artist: response.artist,
                    degree: response.max_degree,
                };
                self.graph = Some(response.graph);
                self.layout_dirty = true;
                self.status = None;
            }
            Err(error) => {
                warn!(%error, "ego query failed");
                self.status = Some(error.to_string());
            }
        }
    }
}
