//! Canvas 2D backend.
//!
//! Cached display lists are replayed onto the visible canvas every frame at
//! the tile's placed origin and paint scale.

use web_sys::CanvasRenderingContext2d;

use super::display_list::{DisplayList, DrawCommand};

const FONT_FAMILY: &str = "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif";

/// Replay a display list onto a 2D context, offset by `origin` and scaled.
pub fn replay(ctx: &CanvasRenderingContext2d, list: &DisplayList, origin: (f64, f64), scale: f64) {
    ctx.save();
    let _ = ctx.translate(origin.0, origin.1);
    let _ = ctx.scale(scale, scale);
    ctx.set_text_baseline("middle");
    for command in list.commands() {
        match command {
            DrawCommand::FillRect { rect, color } => {
                ctx.set_fill_style_str(&color.to_hex());
                ctx.fill_rect(rect.left, rect.top, rect.width, rect.height);
            }
            DrawCommand::Line {
                from,
                to,
                color,
                width,
            } => {
                ctx.set_stroke_style_str(&color.to_hex());
                ctx.set_line_width(*width);
                ctx.begin_path();
                // Half-pixel offset keeps 1px lines crisp.
                ctx.move_to(from.x + 0.5, from.y + 0.5);
                ctx.line_to(to.x + 0.5, to.y + 0.5);
                ctx.stroke();
            }
            DrawCommand::Text {
                origin,
                text,
                color,
                size,
            } => {
                ctx.set_font(&format!("{size}px {FONT_FAMILY}"));
                ctx.set_fill_style_str(&color.to_hex());
                let _ = ctx.fill_text(text, origin.x, origin.y);
            }
        }
    }
    ctx.restore();
}
