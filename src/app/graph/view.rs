use std::collections::HashSet;
use std::time::Instant;

use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, Vec2, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::physics::LayoutSolver;
use super::super::render_utils::{
    circle_visible, draw_background, edge_visible, parse_node_color, world_to_screen,
};
use super::super::{DragState, Scene, ViewModel};
use super::build::build_graph_model;
use super::interaction::ViewTransform;

const CAPITAL_NODE_RADIUS: f32 = 8.0;
const NODE_RADIUS: f32 = 5.0;
const BRIGHT_LABEL_ALPHA: u8 = 230;
const DIM_LABEL_ALPHA: u8 = 77;

impl ViewModel {
    /// Discards the previous scene entirely and builds nodes, edges, solver,
    /// and view transform from the current records.
    pub(in crate::app) fn rebuild_scene(&mut self, size: Vec2) {
        self.scene_dirty = false;
        self.drag = None;
        if let Some(scene) = self.scene.as_mut() {
            scene.solver.stop();
        }

        let mut model = build_graph_model(&self.countries, self.max_neighbors);
        self.node_count = model.nodes.len();
        self.edge_count = model.edges.len();

        if model.nodes.is_empty() {
            self.scene = None;
            self.toasts.error("No countries found in the data set");
            return;
        }

        let isolated_count = model.degree.iter().filter(|&&degree| degree == 0).count();
        let solver = LayoutSolver::start(&mut model, size);
        if isolated_count > 0 {
            self.toasts.info(format!(
                "Found {isolated_count} isolated countries with no connections; placed on the outer ring"
            ));
        }
        self.toasts.success(format!(
            "Graph rendered with {} countries and {} connections",
            self.node_count, self.edge_count
        ));

        self.scene = Some(Scene {
            model,
            solver,
            view: ViewTransform::default_for(size),
            view_anim: None,
        });
    }

    fn search_matches(&self) -> Option<HashSet<usize>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let scene = self.scene.as_ref()?;
        let matcher = SkimMatcherV2::default();
        Some(
            scene
                .model
                .nodes
                .iter()
                .enumerate()
                .filter_map(|(index, node)| {
                    matcher
                        .fuzzy_match(&node.name, query)
                        .or_else(|| matcher.fuzzy_match(&node.code, query))
                        .map(|_| index)
                })
                .collect(),
        )
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let now = Instant::now();
        self.canvas_size = rect.size();

        if self.scene_dirty {
            self.rebuild_scene(rect.size());
        }

        let matches = self.search_matches();
        let params = self.force_params;
        let label_threshold = self.label_degree_threshold;

        let Some(scene) = self.scene.as_mut() else {
            draw_background(&painter, rect, ViewTransform::default_for(rect.size()));
            self.toasts.paint(&painter, rect, now);
            return;
        };

        let _ = scene.current_view(now);
        scene.handle_wheel_zoom(ui, rect, &response);
        scene.handle_pan(&response);

        let ticked = scene.solver.step(&mut scene.model, &params);

        let view = scene.view;
        let node_count = scene.model.nodes.len();
        let mut screen_positions = Vec::with_capacity(node_count);
        let mut screen_radii = Vec::with_capacity(node_count);
        for node in &scene.model.nodes {
            screen_positions.push(world_to_screen(rect, view, node.pos));
            let base = if node.is_capital {
                CAPITAL_NODE_RADIUS
            } else {
                NODE_RADIUS
            };
            screen_radii.push((base * view.scale).max(2.0));
        }

        let pointer = ui.input(|input| input.pointer.hover_pos());
        let hovered = Self::hovered_node(rect, pointer, &screen_positions, &screen_radii);

        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some((index, _)) = hovered
        {
            self.drag = Some(DragState { index });
            scene.begin_node_drag(index);
        }

        if let Some(drag) = &self.drag {
            if response.dragged_by(egui::PointerButton::Primary)
                && let Some(pointer) = pointer
            {
                scene.drag_node_to(drag.index, rect, pointer);
            }
            if response.drag_stopped_by(egui::PointerButton::Primary) {
                let index = drag.index;
                self.drag = None;
                scene.end_node_drag(index);
            }
        } else if response.dragged_by(egui::PointerButton::Primary) {
            scene.pan_by(response.drag_delta());
        }

        draw_background(&painter, rect, view);

        let edge_width = (1.5 * view.scale).clamp(0.5, 3.0);
        let edge_color = Color32::from_rgba_unmultiplied(153, 153, 153, 153);
        for &(source, target) in &scene.model.edges {
            let start = screen_positions[source];
            let end = screen_positions[target];
            if !edge_visible(rect, start, end, 2.0) {
                continue;
            }
            painter.line_segment([start, end], Stroke::new(edge_width, edge_color));
        }

        let search_active = matches.as_ref().is_some_and(|matches| !matches.is_empty());
        for (index, node) in scene.model.nodes.iter().enumerate() {
            let position = screen_positions[index];
            let radius = screen_radii[index];
            if !circle_visible(rect, position, radius + 20.0) {
                continue;
            }

            let is_match = matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));
            let is_hovered = hovered.is_some_and(|(hovered_index, _)| hovered_index == index);
            let is_dragged = self
                .drag
                .as_ref()
                .is_some_and(|drag| drag.index == index);

            let mut fill = parse_node_color(node.color.as_deref());
            if search_active && !is_match {
                fill = fill.gamma_multiply(0.35);
            }

            painter.circle_filled(position, radius, fill);
            let border = if is_hovered || is_dragged {
                Stroke::new(2.0, Color32::from_rgb(245, 206, 93))
            } else if is_match {
                Stroke::new(2.0, Color32::from_rgb(103, 196, 255))
            } else {
                Stroke::new(1.5, Color32::WHITE)
            };
            painter.circle_stroke(position, radius, border);

            // Labels of well-connected countries read at full strength,
            // the rest stay dim.
            let alpha = if scene.model.degree[index] > label_threshold {
                BRIGHT_LABEL_ALPHA
            } else {
                DIM_LABEL_ALPHA
            };
            painter.text(
                position + vec2(radius + 4.0, 0.0),
                Align2::LEFT_CENTER,
                &node.name,
                FontId::proportional(11.0),
                Color32::from_rgba_unmultiplied(235, 235, 235, alpha),
            );
        }

        if let Some((index, _)) = hovered {
            let node = &scene.model.nodes[index];
            let continent = node
                .continent_name
                .clone()
                .or_else(|| node.continent_id.map(|id| format!("continent {id}")))
                .unwrap_or_else(|| "unknown continent".to_owned());
            let hover_line = format!(
                "{} ({})  |  {}  |  {} neighbors",
                node.name, node.code, continent, scene.model.degree[index]
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                hover_line,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        if ticked
            || scene.solver.is_active()
            || scene.view_anim.is_some()
            || response.dragged()
        {
            ui.ctx().request_repaint();
        }

        self.toasts.paint(&painter, rect, now);
    }
}

#[cfg(test)]
mod tests {
    use crate::app::ViewModel;
    use crate::app::ui::status::StatusKind;
    use crate::data::Country;
    use eframe::egui::vec2;

    fn country(id: i64, neighbor_ids: Vec<i64>) -> Country {
        Country {
            id,
            name: format!("country-{id}"),
            code: format!("C{id}"),
            continent_id: None,
            continent_name: None,
            color: None,
            neighbor_ids,
            is_capital: false,
        }
    }

    #[test]
    fn empty_data_set_yields_no_scene_and_an_error_status() {
        let mut model = ViewModel::new(Vec::new());
        model.rebuild_scene(vec2(800.0, 600.0));

        assert!(model.scene.is_none());
        assert!(!model.scene_dirty);
        let statuses = model.toasts.kinds_and_messages();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].0, StatusKind::Error);
    }

    #[test]
    fn isolated_countries_surface_an_info_status_with_their_count() {
        let mut model = ViewModel::new(vec![
            country(1, vec![2]),
            country(2, vec![]),
            country(3, vec![]),
            country(4, vec![]),
        ]);
        model.rebuild_scene(vec2(800.0, 600.0));

        assert!(model.scene.is_some());
        let statuses = model.toasts.kinds_and_messages();
        assert_eq!(statuses[0].0, StatusKind::Info);
        assert!(statuses[0].1.contains("2 isolated"));
        assert_eq!(statuses[1].0, StatusKind::Success);
        assert!(statuses[1].1.contains("4 countries"));
    }
}
