use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use super::graph::interaction::ViewTransform;

/// Default node fill when the record carries no color assignment.
pub(super) const DEFAULT_NODE_COLOR: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);

pub(super) fn world_to_screen(rect: Rect, view: ViewTransform, world: Vec2) -> Pos2 {
    rect.min + view.translation + world * view.scale
}

pub(super) fn screen_to_world(rect: Rect, view: ViewTransform, screen: Pos2) -> Vec2 {
    (screen - rect.min - view.translation) / view.scale
}

/// Parses `#rrggbb` (and the short `#rgb` form); anything else falls back
/// to the default fill.
pub(super) fn parse_node_color(color: Option<&str>) -> Color32 {
    let Some(color) = color else {
        return DEFAULT_NODE_COLOR;
    };
    let hex = color.trim().trim_start_matches('#');

    let channels = match hex.len() {
        6 => {
            let value = u32::from_str_radix(hex, 16).ok();
            value.map(|v| ((v >> 16) as u8, (v >> 8) as u8, v as u8))
        }
        3 => {
            let value = u32::from_str_radix(hex, 16).ok();
            value.map(|v| {
                let r = ((v >> 8) & 0xf) as u8;
                let g = ((v >> 4) & 0xf) as u8;
                let b = (v & 0xf) as u8;
                (r * 17, g * 17, b * 17)
            })
        }
        _ => None,
    };

    match channels {
        Some((r, g, b)) => Color32::from_rgb(r, g, b),
        None => DEFAULT_NODE_COLOR,
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, view: ViewTransform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * view.scale.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + view.translation;

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    fn view(translation: Vec2, scale: f32) -> ViewTransform {
        ViewTransform { translation, scale }
    }

    #[test]
    fn world_screen_round_trip() {
        let rect = Rect::from_min_size(pos2(10.0, 20.0), vec2(800.0, 600.0));
        let view = view(vec2(35.0, -12.0), 1.7);
        let world = vec2(123.0, 456.0);

        let screen = world_to_screen(rect, view, world);
        let back = screen_to_world(rect, view, screen);
        assert!((back - world).length() < 0.001);
    }

    #[test]
    fn parses_long_and_short_hex_colors() {
        assert_eq!(
            parse_node_color(Some("#ff8000")),
            Color32::from_rgb(255, 128, 0)
        );
        assert_eq!(parse_node_color(Some("#fff")), Color32::from_rgb(255, 255, 255));
        assert_eq!(parse_node_color(Some(" #1f77b4 ")), DEFAULT_NODE_COLOR);
    }

    #[test]
    fn falls_back_to_default_color() {
        assert_eq!(parse_node_color(None), DEFAULT_NODE_COLOR);
        assert_eq!(parse_node_color(Some("teal")), DEFAULT_NODE_COLOR);
        assert_eq!(parse_node_color(Some("#zzzzzz")), DEFAULT_NODE_COLOR);
    }

    #[test]
    fn offscreen_circles_are_culled() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0));
        assert!(circle_visible(rect, pos2(50.0, 50.0), 5.0));
        assert!(circle_visible(rect, pos2(-3.0, 50.0), 5.0));
        assert!(!circle_visible(rect, pos2(-20.0, 50.0), 5.0));
    }
}
