use eframe::egui::{self, Align, Context, Layout, Vec2, vec2};

use crate::data::Country;

use super::super::{ForceParams, ViewModel};
use super::status::Toasts;

impl ViewModel {
    pub(in crate::app) const DEFAULT_MAX_NEIGHBORS: usize = 5;
    pub(in crate::app) const DEFAULT_LABEL_DEGREE_THRESHOLD: usize = 2;

    pub(in crate::app) fn new(countries: Vec<Country>) -> Self {
        Self {
            countries,
            max_neighbors: Self::DEFAULT_MAX_NEIGHBORS,
            label_degree_threshold: Self::DEFAULT_LABEL_DEGREE_THRESHOLD,
            force_params: ForceParams::default(),
            scene: None,
            scene_dirty: true,
            search: String::new(),
            toasts: Toasts::new(),
            drag: None,
            node_count: 0,
            edge_count: 0,
            canvas_size: vec2(1440.0, 920.0),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        data_path: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("atlas-graph");
                    ui.separator();
                    ui.label(format!("data: {data_path}"));
                    ui.label(format!("countries: {}", self.node_count));
                    ui.label(format!("connections: {}", self.edge_count));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if is_loading {
                            ui.spinner();
                            ui.label("reloading...");
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading && self.scene.is_none() {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Loading country graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    pub(in crate::app) fn canvas_size(&self) -> Vec2 {
        self.canvas_size
    }
}
