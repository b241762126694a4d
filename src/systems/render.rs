//! Panel rendering with raylib.
//!
//! Panels are drawn in [`UiHost::draw_order`], bottom layer first. Each
//! panel draws its background rect, then its buttons, then its labels, all
//! multiplied by the panel alpha (labels also by their fade group alpha).

use crate::resources::uihost::UiHost;
use raylib::prelude::*;

const CLEAR: Color = Color::new(16, 18, 28, 255);
const BUTTON_FILL: Color = Color::new(52, 60, 92, 255);
const BUTTON_EDGE: Color = Color::new(180, 190, 230, 255);

fn with_alpha(c: Color, alpha: f32) -> Color {
    Color::new(c.r, c.g, c.b, (c.a as f32 * alpha.clamp(0.0, 1.0)) as u8)
}

pub fn render_panels(d: &mut RaylibDrawHandle, ui: &UiHost) {
    d.clear_background(CLEAR);

    for panel in ui.draw_order().filter(|p| p.is_visible()) {
        let view = panel.view();
        let prefab = view.prefab();
        let alpha = view.alpha;

        let [x, y, w, h] = prefab.rect;
        let [r, g, b, a] = prefab.background;
        d.draw_rectangle(
            x as i32,
            y as i32,
            w as i32,
            h as i32,
            with_alpha(Color::new(r, g, b, a), alpha),
        );

        for button in &prefab.buttons {
            let [bx, by, bw, bh] = button.rect;
            d.draw_rectangle(bx as i32, by as i32, bw as i32, bh as i32, with_alpha(BUTTON_FILL, alpha));
            d.draw_rectangle_lines(bx as i32, by as i32, bw as i32, bh as i32, with_alpha(BUTTON_EDGE, alpha));
            let size = 20;
            let text_w = d.measure_text(&button.label, size);
            d.draw_text(
                &button.label,
                (bx + bw * 0.5) as i32 - text_w / 2,
                (by + bh * 0.5) as i32 - size / 2,
                size,
                with_alpha(Color::WHITE, alpha),
            );
        }

        for label in &prefab.labels {
            let text = view.text(&label.id).unwrap_or_default();
            d.draw_text(
                text,
                label.x as i32,
                label.y as i32,
                label.size as i32,
                with_alpha(Color::WHITE, view.label_alpha(label)),
            );
        }
    }
}

/// Position of a left click this frame, if any.
pub fn poll_click(rl: &RaylibHandle) -> Option<(f32, f32)> {
    if rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT) {
        let pos = rl.get_mouse_position();
        return Some((pos.x, pos.y));
    }
    None
}
