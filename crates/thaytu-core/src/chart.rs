//! Radar chart configuration handed to whatever draws the chart.

use std::fmt;

use crate::reply::ChartData;

/// Identifier of a chart container reserved in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChartId(pub u64);

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chart-{}", self.0)
    }
}

/// Draws charts into containers the transcript has already reserved.
///
/// `render` is called exactly once per charted message, after the
/// container with `id` exists in the transcript.
pub trait ChartRenderer {
    fn render(&mut self, id: ChartId, chart: &ChartData);

    /// Release every chart drawn so far
    fn dispose_all(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Blend over an opaque background, for surfaces without alpha
    pub fn over(self, bg: Rgba) -> (u8, u8, u8) {
        let mix = |fg: u8, bg: u8| (fg as f32 * self.a + bg as f32 * (1.0 - self.a)).round() as u8;
        (mix(self.r, bg.r), mix(self.g, bg.g), mix(self.b, bg.b))
    }
}

pub const BACKGROUND: Rgba = Rgba::rgb(0x1a, 0x0f, 0x0a);
pub const FILL_COLOR: Rgba = Rgba::rgba(255, 215, 0, 0.2);
pub const BORDER_COLOR: Rgba = Rgba::rgb(0xff, 0xd7, 0x00);
pub const POINT_COLOR: Rgba = Rgba::rgb(0x8b, 0x00, 0x00);
pub const GRID_COLOR: Rgba = Rgba::rgba(245, 230, 211, 0.2);
pub const LABEL_COLOR: Rgba = Rgba::rgb(0xf5, 0xe6, 0xd3);
pub const TICK_COLOR: Rgba = Rgba::rgba(245, 230, 211, 0.5);

#[derive(Debug, Clone, PartialEq)]
pub struct RadarDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub fill: Rgba,
    pub border: Rgba,
    pub point: Rgba,
    pub border_width: u8,
}

/// Radial value axis. The suggested range is a floor for the drawn range, not a clamp.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialScale {
    pub suggested_min: f64,
    pub suggested_max: f64,
    pub grid: Rgba,
    pub angle_lines: Rgba,
    pub point_labels: Rgba,
    pub ticks: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarChartConfig {
    pub labels: Vec<String>,
    pub dataset: RadarDataset,
    pub scale: RadialScale,
    pub legend: Rgba,
}

impl RadarChartConfig {
    pub fn from_chart(chart: &ChartData) -> Self {
        Self {
            labels: chart.chart_config.labels.clone(),
            dataset: RadarDataset {
                label: format!("Chỉ số năng lượng năm {}", chart.nam_sinh),
                data: chart.chart_config.data.clone(),
                fill: FILL_COLOR,
                border: BORDER_COLOR,
                point: POINT_COLOR,
                border_width: 2,
            },
            scale: RadialScale {
                suggested_min: 0.0,
                suggested_max: 100.0,
                grid: GRID_COLOR,
                angle_lines: GRID_COLOR,
                point_labels: LABEL_COLOR,
                ticks: TICK_COLOR,
            },
            legend: LABEL_COLOR,
        }
    }

    /// The range actually drawn: the suggested range widened to fit the data
    pub fn value_range(&self) -> (f64, f64) {
        self.dataset
            .data
            .iter()
            .filter(|v| v.is_finite())
            .fold((self.scale.suggested_min, self.scale.suggested_max), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Position of `value` along a spoke, 0.0 at the centre and 1.0 at the rim
    pub fn radius_of(&self, value: f64) -> f64 {
        let (lo, hi) = self.value_range();
        if hi <= lo || !value.is_finite() {
            return 0.0;
        }
        (value - lo) / (hi - lo)
    }

    /// Unit-circle direction of spoke `index`, first spoke at twelve o'clock, clockwise
    pub fn spoke(&self, index: usize) -> (f64, f64) {
        let n = self.labels.len().max(1) as f64;
        let angle = std::f64::consts::FRAC_PI_2 - std::f64::consts::TAU * index as f64 / n;
        (angle.cos(), angle.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::extract;

    fn chart(data: &str) -> ChartData {
        let raw = format!(
            r#"```json {{"type":"chart_data","nam_sinh":1995,"chart_config":{{"labels":["Tài","Lộc","Sức khỏe","Tình duyên"],"data":{}}}}} ```"#,
            data
        );
        extract(&raw).chart.expect("fixture should parse")
    }

    #[test]
    fn test_config_carries_labels_data_and_year() {
        let config = RadarChartConfig::from_chart(&chart("[80, 65, 90, 40]"));
        assert_eq!(config.labels.len(), 4);
        assert_eq!(config.dataset.data, vec![80.0, 65.0, 90.0, 40.0]);
        assert_eq!(config.dataset.label, "Chỉ số năng lượng năm 1995");
        assert_eq!(config.dataset.border, BORDER_COLOR);
        assert_eq!(config.dataset.border_width, 2);
    }

    #[test]
    fn test_suggested_range_is_not_a_clamp() {
        let config = RadarChartConfig::from_chart(&chart("[80, 120, 90, -10]"));
        assert_eq!(config.value_range(), (-10.0, 120.0));

        let inside = RadarChartConfig::from_chart(&chart("[10, 20, 30, 40]"));
        assert_eq!(inside.value_range(), (0.0, 100.0));
        assert!((inside.radius_of(50.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_first_spoke_points_up() {
        let config = RadarChartConfig::from_chart(&chart("[1, 2, 3, 4]"));
        let (x, y) = config.spoke(0);
        assert!(x.abs() < 1e-9);
        assert!((y - 1.0).abs() < 1e-9);
        let (x, _) = config.spoke(1);
        assert!(x > 0.99);
    }

    #[test]
    fn test_alpha_blend_over_background() {
        let (r, g, b) = FILL_COLOR.over(Rgba::rgb(0, 0, 0));
        assert_eq!((r, g, b), (51, 43, 0));
    }

    #[test]
    fn test_chart_id_display() {
        assert_eq!(ChartId(7).to_string(), "chart-7");
    }
}
