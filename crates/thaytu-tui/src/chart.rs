//! Terminal radar chart renderer.
//!
//! The transcript reserves a container id and calls [`RadarRenderer::render`];
//! the config is kept per id and drawn on a braille canvas each frame.

use std::collections::HashMap;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Borders,
    },
};
use thaytu_core::chart::{Rgba, BACKGROUND};
use thaytu_core::{ChartData, ChartId, ChartRenderer, RadarChartConfig};

/// Rows a chart occupies in the transcript
pub const CHART_HEIGHT: usize = 14;

const RINGS: usize = 5;
const FILL_STEPS: usize = 12;
const RADIUS_MARGIN: f64 = 1.35;

#[derive(Debug, Default)]
pub struct RadarRenderer {
    charts: HashMap<ChartId, RadarChartConfig>,
}

impl RadarRenderer {
    pub fn get(&self, id: ChartId) -> Option<&RadarChartConfig> {
        self.charts.get(&id)
    }
}

impl ChartRenderer for RadarRenderer {
    fn render(&mut self, id: ChartId, chart: &ChartData) {
        tracing::debug!(%id, labels = chart.chart_config.labels.len(), "rendering radar chart");
        self.charts.insert(id, RadarChartConfig::from_chart(chart));
    }

    fn dispose_all(&mut self) {
        self.charts.clear();
    }
}

/// Terminal colour for a chart colour, alpha blended over the chart background
pub fn to_color(c: Rgba) -> Color {
    let (r, g, b) = c.over(BACKGROUND);
    Color::Rgb(r, g, b)
}

/// Canvas bounds that keep the radar round, given cells about twice as tall as wide
fn bounds_for(area: Rect) -> (f64, f64) {
    let w = area.width.saturating_sub(2).max(1) as f64;
    let h = area.height.saturating_sub(2).max(1) as f64;
    let ratio = w / (h * 2.0);
    if ratio >= 1.0 {
        (RADIUS_MARGIN * ratio, RADIUS_MARGIN)
    } else {
        (RADIUS_MARGIN, RADIUS_MARGIN / ratio)
    }
}

/// Polygon vertices of the dataset, one per label
fn data_points(config: &RadarChartConfig) -> Vec<(f64, f64)> {
    config
        .dataset
        .data
        .iter()
        .take(config.labels.len())
        .enumerate()
        .map(|(i, &value)| {
            let r = config.radius_of(value);
            let (x, y) = config.spoke(i);
            (x * r, y * r)
        })
        .collect()
}

pub fn render_radar(config: &RadarChartConfig, frame: &mut Frame, area: Rect) {
    let (x_span, y_span) = bounds_for(area);
    let char_width = 2.0 * x_span / area.width.saturating_sub(2).max(1) as f64;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(to_color(config.scale.grid)))
        .title(Span::styled(
            format!(" ■ {} ", config.dataset.label),
            Style::default().fg(to_color(config.legend)),
        ));

    let points = data_points(config);
    let grid = to_color(config.scale.grid);
    let angle_lines = to_color(config.scale.angle_lines);
    let fill = to_color(config.dataset.fill);
    let border = to_color(config.dataset.border);
    let point = to_color(config.dataset.point);
    let label_style = Style::default()
        .fg(to_color(config.scale.point_labels))
        .add_modifier(Modifier::BOLD);

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .background_color(to_color(BACKGROUND))
        .x_bounds([-x_span, x_span])
        .y_bounds([-y_span, y_span])
        .paint(|ctx| {
            let n = config.labels.len();
            if n == 0 {
                return;
            }

            for ring in 1..=RINGS {
                let r = ring as f64 / RINGS as f64;
                for i in 0..n {
                    let (x1, y1) = config.spoke(i);
                    let (x2, y2) = config.spoke((i + 1) % n);
                    ctx.draw(&CanvasLine {
                        x1: x1 * r,
                        y1: y1 * r,
                        x2: x2 * r,
                        y2: y2 * r,
                        color: grid,
                    });
                }
            }
            for i in 0..n {
                let (x, y) = config.spoke(i);
                ctx.draw(&CanvasLine {
                    x1: 0.0,
                    y1: 0.0,
                    x2: x,
                    y2: y,
                    color: angle_lines,
                });
            }
            ctx.layer();

            if !points.is_empty() {
                // Fill by sweeping the centre to points along each edge
                for (i, &(x1, y1)) in points.iter().enumerate() {
                    let (x2, y2) = points[(i + 1) % points.len()];
                    for step in 0..FILL_STEPS {
                        let t = step as f64 / FILL_STEPS as f64;
                        ctx.draw(&CanvasLine {
                            x1: 0.0,
                            y1: 0.0,
                            x2: x1 + (x2 - x1) * t,
                            y2: y1 + (y2 - y1) * t,
                            color: fill,
                        });
                    }
                }
                ctx.layer();

                for (i, &(x1, y1)) in points.iter().enumerate() {
                    let (x2, y2) = points[(i + 1) % points.len()];
                    ctx.draw(&CanvasLine { x1, y1, x2, y2, color: border });
                }
                ctx.draw(&Points {
                    coords: &points,
                    color: point,
                });
                ctx.layer();
            }

            for (i, label) in config.labels.iter().enumerate() {
                let (x, y) = config.spoke(i);
                let len = label.chars().count() as f64 * char_width;
                let x_offset = if x < -0.1 {
                    len
                } else if x <= 0.1 {
                    len / 2.0
                } else {
                    0.0
                };
                ctx.print(
                    x * 1.12 - x_offset,
                    y * 1.12,
                    Span::styled(label.clone(), label_style),
                );
            }
        });

    frame.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use thaytu_core::extract;

    fn chart() -> ChartData {
        let raw = r#"```json {"type":"chart_data","nam_sinh":1995,"chart_config":{"labels":["Tài","Lộc","Sức khỏe","Tình duyên","Công danh"],"data":[80,65,90,40,70]}} ```"#;
        extract(raw).chart.expect("fixture parses")
    }

    #[test]
    fn test_renderer_keeps_one_config_per_container() {
        let mut renderer = RadarRenderer::default();
        renderer.render(ChartId(1), &chart());
        renderer.render(ChartId(2), &chart());
        assert!(renderer.get(ChartId(2)).is_some());
        assert_eq!(
            renderer.get(ChartId(1)).map(|c| c.dataset.label.as_str()),
            Some("Chỉ số năng lượng năm 1995")
        );

        renderer.dispose_all();
        assert!(renderer.get(ChartId(1)).is_none());
        assert!(renderer.get(ChartId(2)).is_none());
    }

    #[test]
    fn test_bounds_keep_aspect() {
        let (x, y) = bounds_for(Rect::new(0, 0, 42, 12));
        assert!((x - RADIUS_MARGIN * 2.0).abs() < 1e-9);
        assert!((y - RADIUS_MARGIN).abs() < 1e-9);

        let (x, y) = bounds_for(Rect::new(0, 0, 12, 12));
        assert!((x - RADIUS_MARGIN).abs() < 1e-9);
        assert!(y > RADIUS_MARGIN);
    }

    #[test]
    fn test_mismatched_lengths_are_zipped() {
        let mut config = RadarChartConfig::from_chart(&chart());
        config.dataset.data.truncate(3);
        assert_eq!(data_points(&config).len(), 3);
        config.dataset.data.extend([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(data_points(&config).len(), 5);
    }

    #[test]
    fn test_draws_legend_and_labels() {
        let config = RadarChartConfig::from_chart(&chart());
        let mut terminal = Terminal::new(TestBackend::new(60, CHART_HEIGHT as u16)).unwrap();
        terminal
            .draw(|frame| render_radar(&config, frame, frame.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content.iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Chỉ số năng lượng năm 1995"));
        assert!(text.contains("Lộc"));
    }
}
