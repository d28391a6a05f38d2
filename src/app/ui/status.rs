use std::time::{Duration, Instant};

use eframe::egui::{Color32, FontId, Painter, Rect, pos2, vec2};

const TOAST_TTL: Duration = Duration::from_secs(5);
const MAX_VISIBLE: usize = 4;

/// Transient status surface: load failures, empty data sets, isolated-node
/// counts, render summaries. Each entry expires on its own; nothing here is
/// required for the graph itself to function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum StatusKind {
    Info,
    Success,
    Error,
}

struct Toast {
    message: String,
    kind: StatusKind,
    raised: Instant,
}

pub(in crate::app) struct Toasts {
    entries: Vec<Toast>,
}

impl Toasts {
    pub(in crate::app) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(in crate::app) fn push(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.entries.push(Toast {
            message: message.into(),
            kind,
            raised: Instant::now(),
        });
    }

    pub(in crate::app) fn info(&mut self, message: impl Into<String>) {
        self.push(StatusKind::Info, message);
    }

    pub(in crate::app) fn success(&mut self, message: impl Into<String>) {
        self.push(StatusKind::Success, message);
    }

    pub(in crate::app) fn error(&mut self, message: impl Into<String>) {
        self.push(StatusKind::Error, message);
    }

    #[cfg(test)]
    pub(in crate::app) fn kinds_and_messages(&self) -> Vec<(StatusKind, &str)> {
        self.entries
            .iter()
            .map(|toast| (toast.kind, toast.message.as_str()))
            .collect()
    }

    fn prune(&mut self, now: Instant) {
        self.entries
            .retain(|toast| now.saturating_duration_since(toast.raised) < TOAST_TTL);
    }

    pub(in crate::app) fn paint(&mut self, painter: &Painter, rect: Rect, now: Instant) {
        self.prune(now);

        let mut y = rect.bottom() - 12.0;
        for toast in self.entries.iter().rev().take(MAX_VISIBLE) {
            let background = match toast.kind {
                StatusKind::Info => Color32::from_rgba_unmultiplied(43, 91, 132, 230),
                StatusKind::Success => Color32::from_rgba_unmultiplied(38, 108, 62, 230),
                StatusKind::Error => Color32::from_rgba_unmultiplied(135, 46, 46, 230),
            };

            let galley = painter.layout_no_wrap(
                toast.message.clone(),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
            let size = galley.size() + vec2(16.0, 10.0);
            let min = pos2(rect.right() - size.x - 12.0, y - size.y);
            painter.rect_filled(Rect::from_min_size(min, size), 6.0, background);
            painter.galley(min + vec2(8.0, 5.0), galley, Color32::from_gray(240));
            y = min.y - 8.0;
        }
    }
}
