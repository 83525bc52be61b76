//! Plotters-powered chart widgets for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! Tick labels are drawn by the caller as plain Ratatui text (see `draw_axis_ticks`
//! in the parent module), so these widgets only draw axes, lines and outlines.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::data::{ChoroplethLayer, SHADE_LEVELS};

/// Light to dark blues, one per shade bucket.
const SHADE_PALETTE: [RGBColor; SHADE_LEVELS as usize] = [
    RGBColor(198, 219, 239),
    RGBColor(158, 202, 225),
    RGBColor(107, 174, 214),
    RGBColor(49, 130, 189),
    RGBColor(8, 81, 156),
];
const NO_DATA_COLOR: RGBColor = RGBColor(110, 110, 110);

/// A render-only line chart: one series plus highlighted points.
pub struct LinePlottersChart<'a> {
    pub series: &'a [(f64, f64)],
    /// Drawn on top of the series (e.g. highest/lowest month).
    pub highlights: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for LinePlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if too_small(area, buf) {
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !valid_bounds(x0, x1, y0, y1) {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 1)
                .set_label_area_size(LabelAreaPosition::Bottom, 1)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(0)
                .y_labels(0)
                .axis_style(&WHITE)
                .draw()?;

            let line_color = RGBColor(0, 255, 255); // cyan
            let highlight_color = RGBColor(255, 215, 0); // gold

            chart.draw_series(LineSeries::new(self.series.iter().copied(), &line_color))?;

            // `Circle` radii are mapped incorrectly by the ratatui backend, so
            // highlights are single coloured pixels.
            chart.draw_series(
                self.highlights
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), highlight_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// State outlines coloured by shade bucket.
pub struct ChoroplethPlottersChart<'a> {
    pub layer: &'a ChoroplethLayer,
    /// `(min_lon, min_lat, max_lon, max_lat)`
    pub bbox: (f64, f64, f64, f64),
}

impl<'a> Widget for ChoroplethPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if too_small(area, buf) {
            return;
        }

        let (x0, y0, x1, y1) = self.bbox;
        if !valid_bounds(x0, x1, y0, y1) {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root).margin(1).build_cartesian_2d(x0..x1, y0..y1)?;

            for cell in &self.layer.cells {
                let color = cell
                    .shade
                    .map(|s| SHADE_PALETTE[(s as usize).min(SHADE_PALETTE.len() - 1)])
                    .unwrap_or(NO_DATA_COLOR);
                chart.draw_series(
                    cell.rings
                        .iter()
                        .map(|ring| PathElement::new(ring.clone(), color)),
                )?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

fn too_small(area: Rect, buf: &mut Buffer) -> bool {
    // Plotters may fail to build a chart in a tiny area; show a hint instead.
    if area.width < 20 || area.height < 8 {
        buf.set_string(
            area.x,
            area.y,
            "Chart area too small (resize terminal).",
            Style::default().fg(Color::Yellow),
        );
        return true;
    }
    false
}

fn valid_bounds(x0: f64, x1: f64, y0: f64, y1: f64) -> bool {
    x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite() && x1 > x0 && y1 > y0
}
