use std::time::Instant;

use eframe::egui::{self, Slider, Ui};

use super::super::ViewModel;
use super::super::graph::interaction::ZoomCommand;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.add_space(6.0);
        ui.heading("View");
        ui.horizontal(|ui| {
            let mut command = None;
            if ui.button("Zoom in").clicked() {
                command = Some(ZoomCommand::In);
            }
            if ui.button("Zoom out").clicked() {
                command = Some(ZoomCommand::Out);
            }
            if ui.button("Reset").clicked() {
                command = Some(ZoomCommand::Reset);
            }

            if let Some(command) = command {
                let size = self.canvas_size();
                if let Some(scene) = self.scene.as_mut() {
                    scene.apply_zoom_command(command, size, Instant::now());
                }
            }
        });
        ui.label("Wheel zooms, right/middle drag pans, left drag pins a country.");

        ui.separator();
        ui.heading("Search");
        ui.text_edit_singleline(&mut self.search);

        ui.separator();
        ui.heading("Graph");
        let cap_response = ui.add(
            Slider::new(&mut self.max_neighbors, 1..=10).text("neighbors per country"),
        );
        if cap_response.changed() {
            self.scene_dirty = true;
        }
        ui.add(
            Slider::new(&mut self.label_degree_threshold, 0..=8)
                .text("bright label above degree"),
        );
        if ui.button("Restart layout").clicked() {
            self.scene_dirty = true;
        }

        ui.separator();
        ui.heading("Forces");
        ui.add(
            Slider::new(&mut self.force_params.link_distance, 30.0..=300.0).text("link distance"),
        );
        ui.add(
            Slider::new(&mut self.force_params.charge_strength, -600.0..=0.0).text("charge"),
        );
        ui.add(
            Slider::new(&mut self.force_params.center_strength, 0.0..=0.2).text("centering"),
        );
        ui.add(
            Slider::new(&mut self.force_params.collision_radius, 0.0..=80.0)
                .text("minimum separation"),
        );

        ui.separator();
        egui::CollapsingHeader::new("About")
            .default_open(false)
            .show(ui, |ui| {
                ui.label(
                    "Countries are laid out by a force simulation. Isolated countries \
                     sit pinned on the outer ring; drag any other country to pin it \
                     temporarily.",
                );
            });
    }
}
