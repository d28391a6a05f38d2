use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};

use crate::data::{Country, load_countries};

mod graph;
mod physics;
mod render_utils;
mod ui;

use graph::interaction::{ViewAnimation, ViewTransform};
use physics::LayoutSolver;
use ui::status::Toasts;

pub struct AtlasApp {
    data_path: String,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

type LoadResult = Result<Vec<Country>, String>;

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    countries: Vec<Country>,
    max_neighbors: usize,
    label_degree_threshold: usize,
    force_params: ForceParams,
    scene: Option<Scene>,
    scene_dirty: bool,
    search: String,
    toasts: Toasts,
    drag: Option<DragState>,
    node_count: usize,
    edge_count: usize,
    /// Size of the canvas as of the last frame; zoom commands issued from
    /// the side panel anchor on its center.
    canvas_size: Vec2,
}

/// Everything that is rebuilt from scratch whenever the data set (or the
/// neighbor cap) changes: the graph model, a fresh solver, a fresh view.
struct Scene {
    model: GraphModel,
    solver: LayoutSolver,
    view: ViewTransform,
    view_anim: Option<ViewAnimation>,
}

struct GraphModel {
    nodes: Vec<GraphNode>,
    /// Undirected, deduplicated; endpoints are indices into `nodes`.
    edges: Vec<(usize, usize)>,
    /// Incident-edge count per node over the final edge set.
    degree: Vec<usize>,
}

struct GraphNode {
    id: i64,
    name: String,
    code: String,
    continent_id: Option<i64>,
    continent_name: Option<String>,
    color: Option<String>,
    is_capital: bool,
    pos: Vec2,
    vel: Vec2,
    /// The pin. While set, forces read this node but never move it.
    fixed: Option<Vec2>,
    isolated: bool,
}

/// One in-flight drag gesture over a node.
struct DragState {
    index: usize,
}

#[derive(Clone, Copy)]
struct ForceParams {
    link_distance: f32,
    charge_strength: f32,
    center_strength: f32,
    collision_radius: f32,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            link_distance: 100.0,
            charge_strength: -200.0,
            center_strength: 0.05,
            collision_radius: 30.0,
        }
    }
}

impl AtlasApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_path: String) -> Self {
        let state = Self::start_load(data_path.clone());
        Self {
            data_path,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(data_path: String) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_countries(&data_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: String) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }
}

impl eframe::App for AtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(countries) => AppState::Ready(Box::new(ViewModel::new(countries))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading country graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load country data");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.data_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.data_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.data_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = apply_reload_result(model, result);
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.toasts.error("Reload worker disconnected");
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

/// A failed reload keeps the current scene interactive and surfaces the
/// failure as a status toast; only a successful payload replaces the view.
fn apply_reload_result(model: &mut ViewModel, result: LoadResult) -> Option<AppState> {
    match result {
        Ok(countries) => Some(AppState::Ready(Box::new(ViewModel::new(countries)))),
        Err(error) => {
            model.toasts.error(format!("Reload failed: {error}"));
            None
        }
    }
}
