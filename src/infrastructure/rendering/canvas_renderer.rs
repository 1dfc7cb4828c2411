use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::domain::{
    chart::{Color, Frame, RenderedMarker},
    errors::{AppError, RenderingResult},
};
use crate::time_utils::format_price;

const FONT: &str = "11px ui-monospace, monospace";
const GRID_ROWS: u32 = 4;
const PRICE_LABEL_WIDTH: f64 = 74.0;

fn js_err(context: &str) -> impl Fn(JsValue) -> AppError + '_ {
    move |e| AppError::RenderingError(format!("{context}: {e:?}"))
}

/// Canvas 2D painter for chart frames
pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement, width: f64, height: f64) -> RenderingResult<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(js_err("getContext failed"))?
            .ok_or_else(|| AppError::RenderingError("2D context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| AppError::RenderingError("Failed to cast to 2D context".into()))?;

        let mut renderer = Self { canvas, context, width: 0.0, height: 0.0 };
        renderer.resize(width, height);
        Ok(renderer)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(1.0).round();
        self.height = height.max(1.0).round();
        self.canvas.set_width(self.width as u32);
        self.canvas.set_height(self.height as u32);
    }

    /// Shrink the backing store and clear it; the canvas element itself
    /// belongs to the view.
    pub fn release(&mut self) {
        self.context.clear_rect(0.0, 0.0, self.width, self.height);
        self.canvas.set_width(0);
        self.canvas.set_height(0);
    }

    pub fn paint(&self, frame: &Frame) -> RenderingResult<()> {
        let ctx = &self.context;
        ctx.clear_rect(0.0, 0.0, self.width, self.height);
        ctx.set_fill_style_str(&Color::BACKGROUND.to_css());
        ctx.fill_rect(0.0, 0.0, self.width, self.height);
        ctx.set_font(FONT);

        let Some(viewport) = &frame.viewport else {
            return self.paint_placeholder("Waiting for price…");
        };
        let pane_bottom = viewport.height;

        self.paint_grid(frame, pane_bottom)?;
        self.paint_line(&frame.line);

        if let (Some(last), Some(&(x, y))) = (frame.last_sample, frame.line.last()) {
            ctx.set_fill_style_str(&Color::LINE.to_css());
            ctx.begin_path();
            ctx.arc(x, y, 3.0, 0.0, std::f64::consts::TAU).map_err(js_err("arc"))?;
            ctx.fill();
            self.paint_axis_label(y, &format_price(last.price), Color::LINE)?;
        }

        for marker in &frame.markers {
            self.paint_marker(marker)?;
        }

        if !frame.zoom_label.is_empty() {
            ctx.set_text_align("left");
            ctx.set_fill_style_str(&Color::TEXT.to_css());
            ctx.fill_text(&frame.zoom_label, 8.0, 16.0).map_err(js_err("fill_text"))?;
        }
        Ok(())
    }

    fn paint_placeholder(&self, text: &str) -> RenderingResult<()> {
        self.context.set_text_align("center");
        self.context.set_fill_style_str(&Color::TEXT.to_css());
        self.context
            .fill_text(text, self.width / 2.0, self.height / 2.0)
            .map_err(js_err("fill_text"))
    }

    fn paint_grid(&self, frame: &Frame, pane_bottom: f64) -> RenderingResult<()> {
        let ctx = &self.context;
        ctx.set_stroke_style_str(&Color::GRID.to_css());
        ctx.set_line_width(1.0);
        ctx.begin_path();
        for row in 1..=GRID_ROWS {
            let y = (pane_bottom * row as f64 / (GRID_ROWS + 1) as f64).round() + 0.5;
            ctx.move_to(0.0, y);
            ctx.line_to(self.width, y);
        }
        for tick in &frame.ticks {
            let x = tick.x.round() + 0.5;
            ctx.move_to(x, 0.0);
            ctx.line_to(x, pane_bottom);
        }
        ctx.move_to(0.0, pane_bottom + 0.5);
        ctx.line_to(self.width, pane_bottom + 0.5);
        ctx.stroke();

        ctx.set_text_align("center");
        ctx.set_fill_style_str(&Color::TEXT.to_css());
        let label_y = pane_bottom + (self.height - pane_bottom) / 2.0 + 4.0;
        for tick in &frame.ticks {
            ctx.fill_text(&tick.label, tick.x, label_y).map_err(js_err("fill_text"))?;
        }
        Ok(())
    }

    fn paint_line(&self, points: &[(f64, f64)]) {
        let Some((&(x0, y0), rest)) = points.split_first() else {
            return;
        };
        let ctx = &self.context;
        ctx.set_stroke_style_str(&Color::LINE.to_css());
        ctx.set_line_width(2.0);
        ctx.begin_path();
        ctx.move_to(x0, y0);
        for &(x, y) in rest {
            ctx.line_to(x, y);
        }
        ctx.stroke();
    }

    fn paint_marker(&self, marker: &RenderedMarker) -> RenderingResult<()> {
        let ctx = &self.context;
        let css = marker.color.to_css();
        let dash = js_sys::Array::of2(&JsValue::from_f64(6.0), &JsValue::from_f64(4.0));
        ctx.set_line_dash(&dash).map_err(js_err("set_line_dash"))?;
        ctx.set_stroke_style_str(&css);
        ctx.set_line_width(1.0);
        ctx.begin_path();
        ctx.move_to(0.0, marker.y);
        ctx.line_to(self.width - PRICE_LABEL_WIDTH, marker.y);
        ctx.stroke();
        ctx.set_line_dash(&js_sys::Array::new()).map_err(js_err("set_line_dash"))?;

        ctx.set_text_align("right");
        ctx.set_fill_style_str(&css);
        ctx.fill_text(&marker.title, self.width - PRICE_LABEL_WIDTH - 6.0, marker.y - 4.0)
            .map_err(js_err("fill_text"))?;

        if marker.axis_label_visible {
            self.paint_axis_label(marker.y, &format_price(marker.price), marker.color)?;
        }
        Ok(())
    }

    fn paint_axis_label(&self, y: f64, text: &str, color: Color) -> RenderingResult<()> {
        let ctx = &self.context;
        let x = self.width - PRICE_LABEL_WIDTH;
        ctx.set_fill_style_str(&color.to_css());
        ctx.fill_rect(x, y - 8.0, PRICE_LABEL_WIDTH, 16.0);
        ctx.set_text_align("left");
        ctx.set_fill_style_str(&Color::BACKGROUND.to_css());
        ctx.fill_text(text, x + 4.0, y + 4.0).map_err(js_err("fill_text"))
    }
}
