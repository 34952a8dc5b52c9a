use std::sync::mpsc::{self, Receiver};
use std::thread;

use eframe::egui::{self, Context};

use collab_graph::Configuration;
use collab_graph::cache::CacheOutcome;
use collab_graph::collab::GraphData;
use collab_graph::layout::{LayoutSurface, Viewport};
use collab_graph::service::{EgoRequests, GraphService};

use crate::ServiceOptions;

mod graph;
mod render_utils;
mod ui;

pub struct CollabGraphApp {
    options: ServiceOptions,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<GraphService, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ViewMode {
    Full,
    Ego { artist: String, degree: u32 },
}

struct ViewModel {
    service: GraphService,
    config: Configuration,
    mode: ViewMode,
    graph: Option<GraphData>,
    surface: LayoutSurface,
    ego_requests: EgoRequests,
    ego_degree: u32,
    search: String,
    search_results: Vec<String>,
    last_outcome: Option<CacheOutcome>,
    status: Option<String>,
    graph_dirty: bool,
    layout_dirty: bool,
    viewport: Option<Viewport>,
}

impl CollabGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, options: ServiceOptions) -> Self {
        let state = Self::start_load(options.clone());
        Self { options, state }
    }

    fn spawn_load(options: ServiceOptions) -> Receiver<Result<GraphService, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = options.open().map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(options: ServiceOptions) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(options),
        }
    }
}

impl eframe::App for CollabGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(match result {
                            Ok(service) => AppState::Ready(Box::new(ViewModel::new(service))),
                            Err(error) => AppState::Error(error),
                        });
                    }
                    Err(mpsc::TryRecvError::Empty) => ctx.request_repaint(),
                    Err(mpsc::TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading collaboration dataset...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the collaboration dataset");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.options.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let data_dir = self.options.data_dir.display().to_string();
                model.show(ctx, &data_dir);
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
