//! Ratatui-based terminal UI.
//!
//! Three tabs over one pre-built `DashboardData`:
//! - Calculator: price a weight, convert currency, browse the price history by band
//! - Sales: state table, summary, and the state map (or a bar chart without one)
//! - Insights: top-N states, focus-state monthly trend, regions, weekly rollup

use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs},
};

use crate::analytics::{
    MIN_PRICE_PER_GRAM, filter_by_band, latest_price, monthly_stats, price_stats, quote,
};
use crate::app::pipeline::{DashboardData, load_dashboard};
use crate::app::price_xy;
use crate::data::{ChoroplethLayer, join_choropleth, load_boundaries};
use crate::domain::{Currency, DashboardConfig, PriceBand, PricePoint, WeightUnit};
use crate::error::AppError;
use crate::report;

mod plotters_chart;

use plotters_chart::{ChoroplethPlottersChart, LinePlottersChart};

/// Load the dashboard, then start the TUI.
///
/// Loading happens before the terminal switches to raw mode so input errors
/// print normally.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    let data = load_dashboard(&config)?;
    let layer = if config.map {
        load_boundaries(config.geojson_url.clone(), Some(config.geojson_name_key.clone()))
            .map(|b| join_choropleth(&b, &data.states))
    } else {
        None
    };

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, data, layer);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Calculator,
    Sales,
    Insights,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Calculator, Tab::Sales, Tab::Insights];

    fn title(self) -> &'static str {
        match self {
            Tab::Calculator => "Calculator",
            Tab::Sales => "Sales",
            Tab::Insights => "Insights",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }
}

/// Calculator fields in display order.
const CALC_FIELDS: usize = 4;

struct App {
    config: DashboardConfig,
    data: DashboardData,
    layer: Option<ChoroplethLayer>,

    tab: Tab,
    band: PriceBand,
    price_per_gram: f64,
    weight: f64,
    unit: WeightUnit,
    currency: Currency,
    selected_field: usize,
    status: String,
}

impl App {
    fn new(config: DashboardConfig, data: DashboardData, layer: Option<ChoroplethLayer>) -> Self {
        let price_per_gram = latest_price(&data.prices)
            .map(PricePoint::price_per_gram)
            .unwrap_or(MIN_PRICE_PER_GRAM)
            .max(MIN_PRICE_PER_GRAM);
        let status = match &layer {
            Some(l) => format!("map: {} features", l.cells.len()),
            None => "map unavailable, showing bar chart".to_string(),
        };
        Self {
            config,
            data,
            layer,
            tab: Tab::Calculator,
            band: PriceBand::All,
            price_per_gram,
            weight: 1.0,
            unit: WeightUnit::Grams,
            currency: Currency::Usd,
            selected_field: 0,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::Char('1') => self.tab = Tab::Calculator,
            KeyCode::Char('2') => self.tab = Tab::Sales,
            KeyCode::Char('3') => self.tab = Tab::Insights,
            KeyCode::Char('b') => {
                self.band = self.band.next();
                self.status = format!("band: {}", self.band.display_name());
            }
            KeyCode::Char('c') => {
                self.currency = self.currency.next();
                self.status = format!("currency: {}", self.currency.code());
            }
            KeyCode::Up if self.tab == Tab::Calculator => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down if self.tab == Tab::Calculator => {
                self.selected_field = (self.selected_field + 1).min(CALC_FIELDS - 1);
            }
            KeyCode::Left if self.tab == Tab::Calculator => self.adjust_field(-1.0),
            KeyCode::Right if self.tab == Tab::Calculator => self.adjust_field(1.0),
            KeyCode::Char('d') => {
                match crate::debug::write_debug_bundle(
                    Path::new(crate::debug::DEFAULT_DEBUG_DIR),
                    &self.data,
                    &self.config,
                ) {
                    Ok(path) => {
                        self.status = format!("Wrote debug bundle: {}", path.display());
                    }
                    Err(err) => {
                        self.status = format!("Debug write failed: {err}");
                    }
                }
            }
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: f64) {
        match self.selected_field {
            0 => {
                self.price_per_gram = (self.price_per_gram + delta).max(MIN_PRICE_PER_GRAM);
                self.status = format!("price: {}/g", report::fmt_inr(self.price_per_gram));
            }
            1 => {
                let step = match self.unit {
                    WeightUnit::Grams => 1.0,
                    WeightUnit::Kilograms => 0.1,
                };
                // Round away float drift from repeated 0.1 steps.
                self.weight = ((self.weight + delta * step).max(0.0) * 1000.0).round() / 1000.0;
                self.status = format!("weight: {} {}", self.weight, self.unit.display_name());
            }
            2 => {
                self.unit = match self.unit {
                    WeightUnit::Grams => WeightUnit::Kilograms,
                    WeightUnit::Kilograms => WeightUnit::Grams,
                };
                self.status = format!("unit: {}", self.unit.display_name());
            }
            3 => {
                self.currency = if delta >= 0.0 {
                    self.currency.next()
                } else {
                    prev_currency(self.currency)
                };
                self.status = format!("currency: {}", self.currency.code());
            }
            _ => {}
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);
        match self.tab {
            Tab::Calculator => self.draw_calculator(frame, chunks[2]),
            Tab::Sales => self.draw_sales(frame, chunks[2]),
            Tab::Insights => self.draw_insights(frame, chunks[2]),
        }
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("silver", Style::default().fg(Color::Cyan)),
            Span::raw(" | Silver Price Calculator & Sales Analysis Dashboard"),
        ]));

        let latest = latest_price(&self.data.prices)
            .map(|p| {
                format!(
                    "latest ({}): {}/gram | {}/kg",
                    p.label(),
                    report::fmt_inr(p.price_per_gram()),
                    report::fmt_inr_whole(p.price_per_kg)
                )
            })
            .unwrap_or_else(|| "latest: -".to_string());
        lines.push(Line::from(Span::styled(
            format!(
                "{latest} | national: {} across {} states",
                report::fmt_kg(self.data.summary.total_kg),
                self.data.summary.state_count
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<String> = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{} {}", i + 1, t.title()))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, area);
    }

    fn draw_calculator(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(0)])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(40), Constraint::Percentage(30)])
            .split(rows[0]);

        let items = vec![
            ListItem::new(format!("Price/gram: {}", report::fmt_inr(self.price_per_gram))),
            ListItem::new(format!("Weight: {}", self.weight)),
            ListItem::new(format!("Unit: {}", self.unit.display_name())),
            ListItem::new(format!("Currency: {}", self.currency.code())),
        ];
        let list = List::new(items)
            .block(Block::default().title("Calculate Silver Cost").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");
        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, top[0], &mut state);

        let result = match quote(self.price_per_gram, self.weight, self.unit, self.currency) {
            Ok(q) => report::format_quote(&q),
            Err(err) => err.to_string(),
        };
        let p = Paragraph::new(result).block(Block::default().title("Result").borders(Borders::ALL));
        frame.render_widget(p, top[1]);

        let p = Paragraph::new(report::format_quick_reference(self.price_per_gram))
            .block(Block::default().title("Quick Reference").borders(Borders::ALL));
        frame.render_widget(p, top[2]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(rows[1]);

        let filtered = filter_by_band(&self.data.prices, self.band);
        let stats = price_stats(&filtered);
        let p = Paragraph::new(report::format_price_stats(self.band, stats.as_ref()))
            .block(Block::default().title("Statistics").borders(Borders::ALL));
        frame.render_widget(p, bottom[1]);

        let series: Vec<(f64, f64)> = filtered.iter().map(price_xy).collect();
        let highlights: Vec<(f64, f64)> = match &stats {
            Some(s) => filtered
                .iter()
                .filter(|p| p.price_per_kg == s.highest || p.price_per_kg == s.lowest)
                .map(price_xy)
                .collect(),
            None => Vec::new(),
        };
        let title = format!("Historical Silver Price ({})", self.band.display_name());
        draw_line_chart(frame, bottom[0], &title, &series, &highlights, "year", "INR/kg");
    }

    fn draw_sales(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(50), Constraint::Min(0)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(7)])
            .split(cols[0]);

        let p = Paragraph::new(report::format_state_table(&self.data.ranked))
            .block(Block::default().title("State-wise Purchase Data").borders(Borders::ALL));
        frame.render_widget(p, left[0]);

        let p = Paragraph::new(report::format_state_summary(&self.data.summary))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, left[1]);

        let block = Block::default()
            .title("State-wise Silver Purchase Distribution")
            .borders(Borders::ALL);
        let inner = block.inner(cols[1]);
        frame.render_widget(block, cols[1]);
        frame.render_widget(Clear, inner);

        match self.layer.as_ref().and_then(|l| map_bbox(l).map(|bb| (l, bb))) {
            Some((layer, bbox)) => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(inner);
                frame.render_widget(ChoroplethPlottersChart { layer, bbox }, chunks[0]);
                frame.render_widget(Paragraph::new(report::format_choropleth(layer)), chunks[1]);
            }
            None => {
                let rows: Vec<(String, f64)> = self
                    .data
                    .ranked
                    .iter()
                    .map(|r| (r.state.clone(), r.quantity_kg))
                    .collect();
                let txt = crate::plot::render_bar_chart("kg", &rows, inner.width as usize);
                frame.render_widget(Paragraph::new(txt), inner);
            }
        }
    }

    fn draw_insights(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(12)])
            .split(cols[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(cols[1]);

        let p = Paragraph::new(report::format_insights(
            &self.data.rankings,
            &self.data.ranked,
            &self.data.focus.state,
        ))
        .block(Block::default().title("Top States").borders(Borders::ALL));
        frame.render_widget(p, left[0]);

        let p = Paragraph::new(report::format_regions(&self.data.regional))
            .block(Block::default().title("Regions").borders(Borders::ALL));
        frame.render_widget(p, left[1]);

        let series: Vec<(f64, f64)> = self
            .data
            .focus_monthly
            .iter()
            .map(|m| (m.month.number() as f64, m.quantity_kg))
            .collect();
        let highlights: Vec<(f64, f64)> = monthly_stats(&self.data.focus_monthly)
            .ok()
            .map(|s| {
                vec![
                    (s.highest.month.number() as f64, s.highest.quantity_kg),
                    (s.lowest.month.number() as f64, s.lowest.quantity_kg),
                ]
            })
            .unwrap_or_default();
        let title = format!("{} Monthly Purchases", self.data.focus.state);
        draw_line_chart(frame, right[0], &title, &series, &highlights, "month", "kg");

        let p = Paragraph::new(report::format_weekly_table(&self.data.weekly))
            .block(Block::default().title("Weekly Rollup (daily series)").borders(Borders::ALL));
        frame.render_widget(p, right[1]);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/1-3 switch  ↑/↓ select  ←/→ adjust  b band  c currency  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn prev_currency(cur: Currency) -> Currency {
    let idx = Currency::ALL.iter().position(|c| *c == cur).unwrap_or(0);
    Currency::ALL[(idx + Currency::ALL.len() - 1) % Currency::ALL.len()]
}

fn map_bbox(layer: &ChoroplethLayer) -> Option<(f64, f64, f64, f64)> {
    layer
        .cells
        .iter()
        .flat_map(|c| c.rings.iter().flatten())
        .fold(None, |acc, &(x, y)| match acc {
            None => Some((x, y, x, y)),
            Some((x0, y0, x1, y1)) => Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y))),
        })
}

/// Padded `[min, max]` bounds over `values`, falling back to `[0, 1]`.
fn bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if hi <= lo {
        return [lo - 0.5, hi + 0.5];
    }
    let pad = ((hi - lo) * 0.05).max(1e-12);
    [lo - pad, hi + pad]
}

fn draw_line_chart(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    series: &[(f64, f64)],
    highlights: &[(f64, f64)],
    x_label: &str,
    y_label: &str,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    if series.is_empty() {
        let msg = Paragraph::new("No data in this range (N/A).").style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, inner);
        return;
    }

    let x_bounds = bounds(series.iter().map(|p| p.0));
    let y_bounds = bounds(series.iter().map(|p| p.1));

    let (chart_rect, insets) = chart_layout(inner);
    frame.render_widget(
        LinePlottersChart {
            series,
            highlights,
            x_bounds,
            y_bounds,
        },
        chart_rect,
    );
    if let Some(insets) = insets {
        draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, x_label, y_label);
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

#[allow(clippy::too_many_arguments)]
fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    x_label: &str,
    y_label: &str,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = format!("{x_val:.0}");
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = report::fmt_grouped(y_val, 0);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        let p = Paragraph::new(x_label.to_string())
            .alignment(Alignment::Center)
            .style(style);
        frame.render_widget(p, x_rect);
    }

    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    let p = Paragraph::new(y_label.to_string()).style(style.add_modifier(Modifier::BOLD));
    frame.render_widget(p, y_rect);
}
