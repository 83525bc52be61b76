//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - series: `-` line through consecutive points
//! - optional highlights: `*` (e.g. highest/lowest month)
//! - horizontal bars: `#`, used when no state map is available
//! - choropleth cells: `:+*#@` from low to high, `.` for states without data

use crate::data::ChoroplethLayer;

/// Shade characters, lowest bucket first.
pub const SHADE_CHARS: [char; 5] = [':', '+', '*', '#', '@'];
pub const NO_DATA_CHAR: char = '.';

/// Render a line plot of `points` (x ascending) with optional highlighted points.
pub fn render_line_plot(
    title: &str,
    points: &[(f64, f64)],
    highlights: &[(f64, f64)],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = axis_range(points.iter().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = axis_range(points.iter().chain(highlights).map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the series first (so highlights can overlay).
    draw_series(&mut grid, points, x_min, x_max, y_min, y_max);

    for &(x, y) in highlights {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = '*';
    }

    let mut out = String::new();
    out.push_str(&format!("{title}\n"));
    out.push_str(&format!(
        "Plot: x=[{x_min:.2}, {x_max:.2}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Render labelled horizontal bars scaled to the largest value.
///
/// Negative values draw an empty bar.
pub fn render_bar_chart(title: &str, rows: &[(String, f64)], width: usize) -> String {
    let label_w = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0).min(20);
    let bar_w = width.saturating_sub(label_w + 14).max(10);
    let max = rows.iter().map(|(_, v)| *v).fold(0.0, f64::max);

    let mut out = format!("{title}\n");
    for (label, value) in rows {
        let len = if max > 0.0 && *value > 0.0 {
            ((value / max) * bar_w as f64).round() as usize
        } else {
            0
        };
        let label = crate::report::truncate(label, label_w);
        out.push_str(
            format!(
                "{label:<label_w$} |{:<bar_w$} {}",
                "#".repeat(len),
                crate::report::fmt_grouped(*value, 0)
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Rasterize the joined state outlines, one character per cell centre.
pub fn render_choropleth(title: &str, layer: &ChoroplethLayer, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut out = format!("{title}\n");
    let Some((x0, y0, x1, y1)) = layer_bbox(layer) else {
        out.push_str("(no boundaries)\n");
        return out;
    };

    // Per-ring bounding boxes, so most cells skip the full polygon test.
    let rings: Vec<(char, (f64, f64, f64, f64), &[(f64, f64)])> = layer
        .cells
        .iter()
        .flat_map(|cell| {
            let ch = cell
                .shade
                .map(|s| SHADE_CHARS[(s as usize).min(SHADE_CHARS.len() - 1)])
                .unwrap_or(NO_DATA_CHAR);
            cell.rings
                .iter()
                .filter_map(move |ring| ring_bbox(ring).map(|bb| (ch, bb, ring.as_slice())))
        })
        .collect();

    for row in 0..height {
        let lat = y1 - (row as f64 + 0.5) / height as f64 * (y1 - y0);
        let mut line = String::with_capacity(width);
        for col in 0..width {
            let lon = x0 + (col as f64 + 0.5) / width as f64 * (x1 - x0);
            let ch = rings
                .iter()
                .find(|(_, bb, ring)| {
                    lon >= bb.0 && lon <= bb.2 && lat >= bb.1 && lat <= bb.3 && point_in_ring(lon, lat, ring)
                })
                .map(|(ch, _, _)| *ch)
                .unwrap_or(' ');
            line.push(ch);
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let legend: String = SHADE_CHARS.iter().collect();
    out.push_str(&format!(
        "legend: {NO_DATA_CHAR} no data | {legend} low..high (max {})\n",
        crate::report::fmt_kg(layer.max_kg)
    ));
    out
}

fn layer_bbox(layer: &ChoroplethLayer) -> Option<(f64, f64, f64, f64)> {
    layer
        .cells
        .iter()
        .flat_map(|c| c.rings.iter())
        .filter_map(|r| ring_bbox(r))
        .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
}

fn ring_bbox(ring: &[(f64, f64)]) -> Option<(f64, f64, f64, f64)> {
    let &(x, y) = ring.first()?;
    Some(ring.iter().fold((x, y, x, y), |(x0, y0, x1, y1), &(x, y)| {
        (x0.min(x), y0.min(y), x1.max(x), y1.max(y))
    }))
}

/// Even-odd ray casting.
fn point_in_ring(x: f64, y: f64, ring: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let mut j = ring.len().saturating_sub(1);
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn axis_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max > min {
        Some((min, max))
    } else {
        Some((min - 0.5, max + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series(grid: &mut [Vec<char>], points: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in points.iter().filter(|(x, y)| x.is_finite() && y.is_finite()) {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ChoroplethCell;

    #[test]
    fn plot_golden_snapshot_small() {
        let points = vec![(1.0, 100.0), (10.0, 100.0)];
        let txt = render_line_plot("flat", &points, &[(10.0, 110.0)], 10, 5);
        let expected = concat!(
            "flat\n",
            "Plot: x=[1.00, 10.00] | y=[99.50, 110.50]\n",
            "         *\n",
            "          \n",
            "          \n",
            "          \n",
            "----------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_series_renders_blank_grid() {
        let txt = render_line_plot("none", &[], &[], 10, 5);
        assert_eq!(txt.lines().count(), 7);
        assert!(txt.lines().skip(2).all(|l| l.trim().is_empty()));
    }

    fn square(name: &str, x0: f64, x1: f64, shade: Option<u8>) -> ChoroplethCell {
        ChoroplethCell {
            name: name.to_string(),
            quantity_kg: shade.map(|s| s as f64),
            shade,
            rings: vec![vec![(x0, 0.0), (x1, 0.0), (x1, 10.0), (x0, 10.0), (x0, 0.0)]],
        }
    }

    #[test]
    fn choropleth_shades_cells_by_bucket() {
        let layer = ChoroplethLayer {
            cells: vec![square("A", 0.0, 5.0, Some(4)), square("B", 5.0, 10.0, None)],
            unmatched_states: Vec::new(),
            max_kg: 4.0,
        };
        let txt = render_choropleth("map", &layer, 10, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 7);
        for row in &lines[1..6] {
            assert_eq!(*row, "@@@@@.....");
        }
        assert!(lines[6].starts_with("legend: . no data"));
    }

    #[test]
    fn choropleth_without_rings_says_so() {
        let layer = ChoroplethLayer {
            cells: Vec::new(),
            unmatched_states: vec!["Goa".to_string()],
            max_kg: 0.0,
        };
        assert_eq!(render_choropleth("map", &layer, 10, 5), "map\n(no boundaries)\n");
    }

    #[test]
    fn point_in_ring_inside_and_outside() {
        let ring = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)];
        assert!(point_in_ring(2.0, 2.0, &ring));
        assert!(!point_in_ring(5.0, 2.0, &ring));
        assert!(!point_in_ring(2.0, -1.0, &ring));
    }

    #[test]
    fn bars_scale_to_max() {
        let rows = vec![("Kerala".to_string(), 9_200.0), ("Goa".to_string(), 4_600.0)];
        let txt = render_bar_chart("Purchases", &rows, 40);
        let expected = concat!(
            "Purchases\n",
            "Kerala |#################### 9,200\n",
            "Goa    |##########           4,600\n",
        );
        assert_eq!(txt, expected);
    }
}
