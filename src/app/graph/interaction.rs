use std::time::{Duration, Instant};

use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::render_utils::screen_to_world;
use super::super::{Scene, ViewModel};

pub(in crate::app) const MIN_SCALE: f32 = 0.1;
pub(in crate::app) const MAX_SCALE: f32 = 4.0;
const ZOOM_IN_FACTOR: f32 = 1.3;
const ZOOM_OUT_FACTOR: f32 = 0.7;
const DEFAULT_SCALE: f32 = 0.8;
const ANIMATION_DURATION: Duration = Duration::from_millis(300);

/// Pan/zoom state applied between world space (viewport units, origin at
/// the canvas top-left) and screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct ViewTransform {
    pub(in crate::app) translation: Vec2,
    pub(in crate::app) scale: f32,
}

impl ViewTransform {
    /// The reset target: offset by a quarter viewport, slightly zoomed out.
    pub(in crate::app) fn default_for(size: Vec2) -> Self {
        Self {
            translation: size * 0.25,
            scale: DEFAULT_SCALE,
        }
    }

    fn clamped(translation: Vec2, scale: f32) -> Self {
        Self {
            translation,
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
        }
    }
}

/// A 300 ms eased transition between two view transforms. Discrete zoom
/// commands animate; direct gestures apply immediately and cancel this.
pub(in crate::app) struct ViewAnimation {
    from: ViewTransform,
    to: ViewTransform,
    started: Instant,
}

impl ViewAnimation {
    pub(in crate::app) fn new(from: ViewTransform, to: ViewTransform, now: Instant) -> Self {
        Self { from, to, started: now }
    }

    pub(in crate::app) fn target(&self) -> ViewTransform {
        self.to
    }

    pub(in crate::app) fn sample(&self, now: Instant) -> ViewTransform {
        let progress = (now - self.started).as_secs_f32() / ANIMATION_DURATION.as_secs_f32();
        let t = ease_in_out_cubic(progress.clamp(0.0, 1.0));
        ViewTransform {
            translation: self.from.translation + (self.to.translation - self.from.translation) * t,
            scale: self.from.scale + (self.to.scale - self.from.scale) * t,
        }
    }

    pub(in crate::app) fn finished(&self, now: Instant) -> bool {
        now - self.started >= ANIMATION_DURATION
    }
}

fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - (u * u * u) / 2.0
    }
}

#[derive(Clone, Copy)]
pub(in crate::app) enum ZoomCommand {
    In,
    Out,
    Reset,
}

impl Scene {
    /// Current transform, advancing (and retiring) an in-flight animation.
    pub(in crate::app) fn current_view(&mut self, now: Instant) -> ViewTransform {
        if let Some(anim) = &self.view_anim {
            let sampled = anim.sample(now);
            let done = anim.finished(now);
            self.view = sampled;
            if done {
                self.view_anim = None;
            }
        }
        self.view
    }

    /// A direct gesture takes over from wherever the animation currently is.
    fn cancel_animation(&mut self, now: Instant) {
        if self.view_anim.is_some() {
            self.view = self.current_view(now);
            self.view_anim = None;
        }
    }

    pub(in crate::app) fn apply_zoom_command(&mut self, command: ZoomCommand, size: Vec2, now: Instant) {
        // Chained commands compound from the in-flight target, not from the
        // half-way sample, so rapid clicks accumulate cleanly.
        let from = self.current_view(now);
        let base = self.view_anim.as_ref().map(|anim| anim.target()).unwrap_or(from);

        let to = match command {
            ZoomCommand::In => zoom_about(base, size * 0.5, ZOOM_IN_FACTOR),
            ZoomCommand::Out => zoom_about(base, size * 0.5, ZOOM_OUT_FACTOR),
            ZoomCommand::Reset => ViewTransform::default_for(size),
        };

        self.view_anim = Some(ViewAnimation::new(from, to, now));
    }

    pub(in crate::app) fn handle_wheel_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        self.cancel_animation(Instant::now());
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.view = zoom_about(self.view, pointer - rect.min, factor);
    }

    pub(in crate::app) fn handle_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.cancel_animation(Instant::now());
            self.view.translation += response.drag_delta();
        }
    }

    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        self.cancel_animation(Instant::now());
        self.view.translation += delta;
    }
}

/// Rescales while keeping the world point under `anchor` (in rect-local
/// screen coordinates) fixed on screen.
fn zoom_about(view: ViewTransform, anchor: Vec2, factor: f32) -> ViewTransform {
    let next_scale = (view.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
    let world_at_anchor = (anchor - view.translation) / view.scale;
    ViewTransform::clamped(anchor - world_at_anchor * next_scale, next_scale)
}

impl ViewModel {
    pub(in crate::app) fn hovered_node(
        rect: Rect,
        pointer: Option<Pos2>,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<(usize, f32)> {
        let pointer = pointer.filter(|pos| rect.contains(*pos))?;
        (0..screen_positions.len())
            .filter_map(|index| {
                let distance = screen_positions[index].distance(pointer);
                if distance <= screen_radii[index] + 3.0 {
                    Some((index, distance))
                } else {
                    None
                }
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Drag gestures over a node translate into solver commands; the view model
/// never writes node positions directly.
impl Scene {
    pub(in crate::app) fn begin_node_drag(&mut self, index: usize) {
        let point = self.model.nodes[index].pos;
        self.solver.pin(&mut self.model, index, point);
        self.solver.reheat();
    }

    pub(in crate::app) fn drag_node_to(&mut self, index: usize, rect: Rect, pointer: Pos2) {
        let world = screen_to_world(rect, self.view, pointer);
        self.solver.pin(&mut self.model, index, world);
    }

    /// Gesture end: a connected node goes free again, an isolated node
    /// stays wherever it was dropped.
    pub(in crate::app) fn end_node_drag(&mut self, index: usize) {
        self.solver.cool();
        if !self.model.nodes[index].isolated {
            self.solver.unpin(&mut self.model, index);
        }
    }
}
