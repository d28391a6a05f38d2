mod forces;
mod quadtree;

use std::f32::consts::TAU;
use std::time::{Duration, Instant};

use eframe::egui::{Vec2, vec2};

use crate::util::stable_pair;

use super::{ForceParams, GraphModel};

const ALPHA_MIN: f32 = 0.001;
const ALPHA_DECAY: f32 = 0.0228;
const REHEAT_TARGET: f32 = 0.3;
const VELOCITY_DAMPING: f32 = 0.6;
/// Hard wall-clock bound on a solver run; the layout stops reacting after
/// this even if it never converged, until a reheat restarts the clock.
const RUN_BUDGET: Duration = Duration::from_secs(10);
/// Isolated nodes sit on a circle of this fraction of the shorter
/// viewport side.
const ISOLATED_RING_FACTOR: f32 = 0.4;

/// Iterative force-directed position solver. One `step` per frame; control
/// commands (`reheat`, `cool`, `pin`, `unpin`, `stop`) are O(1) state
/// transitions on the running instance.
pub(in crate::app) struct LayoutSolver {
    alpha: f32,
    alpha_target: f32,
    started: Instant,
    budget: Duration,
    stopped: bool,
    center: Vec2,
    scratch: ForceScratch,
}

pub(in crate::app) struct ForceScratch {
    pub(in crate::app) forces: Vec<Vec2>,
    pub(in crate::app) positions: Vec<Vec2>,
}

impl LayoutSolver {
    /// Seeds positions and pins, then returns a running solver.
    ///
    /// Nodes with no incident edge are placed evenly on a ring around the
    /// viewport center and pinned for the lifetime of this instance; only a
    /// later drag release may free one. Connected nodes start scattered
    /// around the center and are subject to the full force system.
    pub(in crate::app) fn start(model: &mut GraphModel, viewport: Vec2) -> Self {
        Self::with_budget(model, viewport, RUN_BUDGET)
    }

    pub(in crate::app) fn with_budget(
        model: &mut GraphModel,
        viewport: Vec2,
        budget: Duration,
    ) -> Self {
        let center = viewport * 0.5;
        let ring_radius = ISOLATED_RING_FACTOR * viewport.x.min(viewport.y);
        let scatter = 0.25 * viewport.x.min(viewport.y).max(1.0);

        let isolated_count = model.degree.iter().filter(|&&degree| degree == 0).count();
        let mut ring_slot = 0usize;

        for (index, node) in model.nodes.iter_mut().enumerate() {
            node.vel = Vec2::ZERO;
            if model.degree[index] == 0 {
                let angle = (ring_slot as f32 / isolated_count as f32) * TAU;
                let point = center + vec2(angle.cos(), angle.sin()) * ring_radius;
                node.pos = point;
                node.fixed = Some(point);
                node.isolated = true;
                ring_slot += 1;
            } else {
                let (jx, jy) = stable_pair(node.id);
                node.pos = center + vec2(jx, jy) * scatter;
                node.fixed = None;
                node.isolated = false;
            }
        }

        Self {
            alpha: 1.0,
            alpha_target: 0.0,
            started: Instant::now(),
            budget,
            stopped: false,
            center,
            scratch: ForceScratch {
                forces: Vec::new(),
                positions: Vec::new(),
            },
        }
    }

    /// One integration tick. Returns whether any node moved; returns false
    /// without touching positions once the solver is stopped, past its time
    /// budget, or settled.
    pub(in crate::app) fn step(&mut self, model: &mut GraphModel, params: &ForceParams) -> bool {
        if self.stopped || self.started.elapsed() >= self.budget {
            return false;
        }
        if self.settled() {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * ALPHA_DECAY;

        forces::accumulate_forces(
            &model.nodes,
            &model.edges,
            self.center,
            self.alpha,
            params,
            &mut self.scratch,
        );

        let mut moved = false;
        for (node, force) in model.nodes.iter_mut().zip(&self.scratch.forces) {
            if let Some(fixed) = node.fixed {
                node.pos = fixed;
                node.vel = Vec2::ZERO;
                continue;
            }

            node.vel = (node.vel + *force) * VELOCITY_DAMPING;
            node.pos += node.vel;
            if node.vel.length_sq() > 0.000_001 {
                moved = true;
            }
        }

        moved
    }

    /// Raises the energy target so the system visibly reacts again, e.g. to
    /// a pinned node being dragged. A drag can arrive long after the budget
    /// ran out; the clock restarts so the scene follows the moved pin
    /// instead of staying frozen. No-op only after an explicit `stop`.
    pub(in crate::app) fn reheat(&mut self) {
        if self.stopped {
            return;
        }
        if self.started.elapsed() >= self.budget {
            self.started = Instant::now();
        }
        self.alpha_target = REHEAT_TARGET;
        self.alpha = self.alpha.max(REHEAT_TARGET);
    }

    /// Lets the system settle again after a drag ends.
    pub(in crate::app) fn cool(&mut self) {
        self.alpha_target = 0.0;
    }

    pub(in crate::app) fn pin(&self, model: &mut GraphModel, index: usize, point: Vec2) {
        if let Some(node) = model.nodes.get_mut(index) {
            node.fixed = Some(point);
            node.pos = point;
            node.vel = Vec2::ZERO;
        }
    }

    pub(in crate::app) fn unpin(&self, model: &mut GraphModel, index: usize) {
        if let Some(node) = model.nodes.get_mut(index) {
            node.fixed = None;
        }
    }

    /// Explicit teardown; terminal and idempotent, safe to call from any
    /// event handler. Not even a reheat revives a stopped solver.
    pub(in crate::app) fn stop(&mut self) {
        self.stopped = true;
    }

    pub(in crate::app) fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn settled(&self) -> bool {
        self.alpha < ALPHA_MIN && self.alpha_target < ALPHA_MIN
    }

    /// Whether the next `step` would do integration work.
    pub(in crate::app) fn is_active(&self) -> bool {
        !self.is_stopped() && !self.settled() && self.started.elapsed() < self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::{ALPHA_MIN, LayoutSolver, REHEAT_TARGET, RUN_BUDGET};
    use crate::app::graph::build::build_graph_model;
    use crate::app::{ForceParams, GraphModel};
    use crate::data::Country;
    use eframe::egui::vec2;
    use std::time::Duration;

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

    fn connected_pair_model() -> GraphModel {
        build_graph_model(&[country(1, vec![2]), country(2, vec![])], 5)
    }

    #[test]
    fn isolated_nodes_land_on_ring_and_are_pinned() {
        let mut model = build_graph_model(
            &[
                country(1, vec![2]),
                country(2, vec![]),
                country(3, vec![]),
                country(4, vec![]),
            ],
            5,
        );
        let viewport = vec2(800.0, 600.0);
        let solver = LayoutSolver::start(&mut model, viewport);

        let center = viewport * 0.5;
        let radius = 0.4 * 600.0;
        let isolated = model
            .nodes
            .iter()
            .filter(|node| node.isolated)
            .collect::<Vec<_>>();
        assert_eq!(isolated.len(), 2);
        for node in &isolated {
            assert_eq!(node.fixed, Some(node.pos));
            let distance = (node.pos - center).length();
            assert!((distance - radius).abs() < 0.01, "distance {distance}");
        }

        // First ring slot is at angle zero.
        assert_eq!(isolated[0].pos, center + vec2(radius, 0.0));
        assert!(!solver.is_stopped());
    }

    #[test]
    fn connected_nodes_are_free_and_distinct() {
        let mut model = connected_pair_model();
        let _solver = LayoutSolver::start(&mut model, vec2(800.0, 600.0));

        assert!(model.nodes.iter().all(|node| node.fixed.is_none()));
        assert!(model.nodes.iter().all(|node| !node.isolated));
        assert_ne!(model.nodes[0].pos, model.nodes[1].pos);
    }

    #[test]
    fn isolated_pins_survive_ticks() {
        let mut model = build_graph_model(&[country(1, vec![2]), country(2, vec![]), country(7, vec![])], 5);
        let mut solver = LayoutSolver::start(&mut model, vec2(800.0, 600.0));
        let params = ForceParams::default();

        let pinned_index = model.nodes.iter().position(|node| node.isolated).unwrap();
        let pinned_at = model.nodes[pinned_index].pos;
        for _ in 0..50 {
            solver.step(&mut model, &params);
        }
        assert_eq!(model.nodes[pinned_index].pos, pinned_at);
        assert_eq!(model.nodes[pinned_index].fixed, Some(pinned_at));
    }

    #[test]
    fn solver_respects_wall_clock_budget() {
        let mut model = connected_pair_model();
        let mut solver =
            LayoutSolver::with_budget(&mut model, vec2(800.0, 600.0), Duration::from_millis(10));
        let params = ForceParams::default();

        assert!(solver.step(&mut model, &params));
        std::thread::sleep(Duration::from_millis(20));
        assert!(!solver.step(&mut model, &params));
        assert!(!solver.is_active());
    }

    #[test]
    fn reheat_revives_a_budget_expired_run() {
        let mut model = connected_pair_model();
        let mut solver =
            LayoutSolver::with_budget(&mut model, vec2(800.0, 600.0), Duration::from_millis(10));
        let params = ForceParams::default();

        std::thread::sleep(Duration::from_millis(20));
        assert!(!solver.step(&mut model, &params));

        // A drag after the budget ran out restarts the clock.
        solver.reheat();
        assert!(solver.is_active());
        assert!(solver.step(&mut model, &params));
    }

    #[test]
    fn default_budget_is_ten_seconds() {
        assert_eq!(RUN_BUDGET, Duration::from_secs(10));
    }

    #[test]
    fn reheat_and_cool_are_state_transitions() {
        let mut model = connected_pair_model();
        let mut solver = LayoutSolver::start(&mut model, vec2(800.0, 600.0));

        solver.cool();
        assert_eq!(solver.alpha_target, 0.0);
        solver.reheat();
        assert_eq!(solver.alpha_target, REHEAT_TARGET);
        solver.cool();
        assert_eq!(solver.alpha_target, 0.0);
    }

    #[test]
    fn solver_settles_once_alpha_decays() {
        let mut model = connected_pair_model();
        let mut solver = LayoutSolver::start(&mut model, vec2(800.0, 600.0));
        solver.alpha = ALPHA_MIN / 2.0;
        solver.alpha_target = 0.0;

        let params = ForceParams::default();
        assert!(!solver.step(&mut model, &params));
        assert!(!solver.is_active());
        assert!(!solver.is_stopped(), "settled is not terminal");

        // A reheat revives a settled (but not stopped) solver.
        solver.reheat();
        assert!(solver.is_active());
        assert!(solver.step(&mut model, &params));
    }

    #[test]
    fn pin_holds_and_unpin_frees_a_node() {
        let mut model = connected_pair_model();
        let mut solver = LayoutSolver::start(&mut model, vec2(800.0, 600.0));
        let params = ForceParams::default();

        let point = vec2(111.0, 222.0);
        solver.pin(&mut model, 0, point);
        solver.reheat();
        for _ in 0..20 {
            solver.step(&mut model, &params);
        }
        assert_eq!(model.nodes[0].pos, point);

        solver.unpin(&mut model, 0);
        solver.cool();
        for _ in 0..20 {
            solver.step(&mut model, &params);
        }
        assert!(model.nodes[0].fixed.is_none());
        assert_ne!(model.nodes[0].pos, point, "freed node moves again");
    }

    #[test]
    fn stop_is_idempotent() {
        let mut model = connected_pair_model();
        let mut solver = LayoutSolver::start(&mut model, vec2(800.0, 600.0));
        solver.stop();
        solver.stop();
        assert!(solver.is_stopped());
        assert!(!solver.step(&mut model, &ForceParams::default()));

        // Unlike a budget expiry, an explicit stop is terminal.
        solver.reheat();
        assert!(!solver.step(&mut model, &ForceParams::default()));
        assert!(solver.is_stopped());
    }

    #[test]
    fn free_nodes_do_not_collapse_to_one_point() {
        let mut model = build_graph_model(
            &[
                country(1, vec![2, 3, 4]),
                country(2, vec![3]),
                country(3, vec![4]),
                country(4, vec![1]),
            ],
            5,
        );
        let mut solver = LayoutSolver::start(&mut model, vec2(800.0, 600.0));
        let params = ForceParams::default();
        for _ in 0..300 {
            solver.step(&mut model, &params);
        }

        for i in 0..model.nodes.len() {
            for j in (i + 1)..model.nodes.len() {
                let gap = (model.nodes[i].pos - model.nodes[j].pos).length();
                assert!(gap > 1.0, "nodes {i} and {j} converged to one point");
            }
        }
    }

    #[test]
    fn empty_model_starts_without_panicking() {
        let mut model = build_graph_model(&[], 5);
        let mut solver = LayoutSolver::start(&mut model, vec2(800.0, 600.0));
        assert!(!solver.step(&mut model, &ForceParams::default()));
    }
}
