use std::f32::consts::TAU;

use egui::{Color32, Pos2, Rect, Stroke, Vec2};
use radio_vu::meter::{bar_rotation_deg, BarLevel, Star};

const BAR_COLOR: Color32 = Color32::from_rgb(120, 220, 255);
const BACKGROUND: Color32 = Color32::from_rgb(8, 8, 24);

/// Draws the ring of bars the way the page lays them out: each bar hangs from
/// the centre, rotated by its slot, with its length taken from `height_px`.
pub fn draw_meter(painter: &egui::Painter, rect: Rect, levels: &[BarLevel], max_height_px: f32) {
    let center = rect.center();
    let radius = rect.width().min(rect.height()) * 0.45;
    let px = radius / max_height_px.max(1.0);
    let inner = radius * 0.25;
    let width = (TAU * inner / levels.len().max(1) as f32 * 0.6).max(1.5);

    for (i, level) in levels.iter().enumerate() {
        let angle = bar_rotation_deg(i, levels.len()).to_radians();
        // CSS rotate() turns a downward bar clockwise on a y-down screen.
        let dir = Vec2::new(-angle.sin(), angle.cos());
        let start = center + dir * inner;
        let end = start + dir * (level.height_px * px - inner).max(1.0);
        let alpha = (level.opacity.clamp(0.0, 1.0) * 255.0) as u8;
        let color = Color32::from_rgba_unmultiplied(BAR_COLOR.r(), BAR_COLOR.g(), BAR_COLOR.b(), alpha);
        painter.line_segment([start, end], Stroke::new(width, color));
    }
}

/// Twinkling star field behind the meter; `time` in seconds.
pub fn draw_stars(painter: &egui::Painter, rect: Rect, stars: &[Star], time: f32) {
    painter.rect_filled(rect, 0.0, BACKGROUND);
    for star in stars {
        let pos = Pos2::new(
            rect.left() + rect.width() * star.left_pct / 100.0,
            rect.top() + rect.height() * star.top_pct / 100.0,
        );
        let phase = ((time + star.delay_s) / 5.0 * TAU).sin();
        let alpha = (80.0 + 175.0 * (0.5 + 0.5 * phase)) as u8;
        painter.circle_filled(pos, star.size_px / 2.0, Color32::from_white_alpha(alpha));
    }
}
