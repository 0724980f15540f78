//! Extraction of the embedded chart block from assistant replies.
//!
//! A reply may carry one fenced ```` ```json ```` block whose object has
//! `"type": "chart_data"`. Only the first such block is used. A block that
//! fails to parse leaves the reply untouched.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Discriminant of the chart payload, must be exactly `"chart_data"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    #[serde(rename = "chart_data")]
    ChartData,
}

/// Birth year as sent by the assistant, either a number or free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BirthYear {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for BirthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BirthYear::Number(n) => write!(f, "{}", n),
            BirthYear::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

/// Structured chart payload embedded in a reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub nam_sinh: BirthYear,
    pub chart_config: ChartSeries,
}

/// A reply split into prose and optional chart data
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub display_text: String,
    pub chart: Option<ChartData>,
}

impl ParsedReply {
    fn plain(raw: &str) -> Self {
        Self {
            display_text: raw.to_string(),
            chart: None,
        }
    }
}

/// A ```` ```json ```` fence; the body can never run past its own closing fence
static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```json\s*((?:[^`]|`[^`]|``[^`])*?)\s*```").unwrap()
});

static CHART_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)^\{.*"type"\s*:\s*"chart_data".*\}$"#).unwrap());

/// Separate the first chart block from the prose around it
pub fn extract(raw: &str) -> ParsedReply {
    let chart_fence = JSON_FENCE
        .captures_iter(raw)
        .filter_map(|caps| Some((caps.get(0)?, caps.get(1)?)))
        .find(|(_, body)| CHART_BODY.is_match(body.as_str()));
    let Some((block, body)) = chart_fence else {
        return ParsedReply::plain(raw);
    };

    match serde_json::from_str::<ChartData>(body.as_str()) {
        Ok(chart) => {
            let mut display_text = String::with_capacity(raw.len() - block.len());
            display_text.push_str(&raw[..block.start()]);
            display_text.push_str(&raw[block.end()..]);
            ParsedReply {
                display_text: display_text.trim().to_string(),
                chart: Some(chart),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse embedded chart block, showing reply as text");
            ParsedReply::plain(raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_BLOCK: &str = r#"```json {"type":"chart_data","nam_sinh":1995,"chart_config":{"labels":["A","B"],"data":[10,20]}} ```"#;

    #[test]
    fn test_plain_reply_is_unchanged() {
        let raw = "Bạn sinh năm 2001, tuổi **Tân Tỵ**.\nNăm nay sao Thái Bạch chiếu mệnh.";
        let parsed = extract(raw);
        assert_eq!(parsed.display_text, raw);
        assert!(parsed.chart.is_none());
    }

    #[test]
    fn test_valid_block_is_removed_and_parsed() {
        let raw = format!("{}\nTuổi này năm nay vượng tài lộc.", VALID_BLOCK);
        let parsed = extract(&raw);

        assert_eq!(parsed.display_text, "Tuổi này năm nay vượng tài lộc.");
        let chart = parsed.chart.expect("chart should be extracted");
        assert_eq!(chart.kind, ChartKind::ChartData);
        assert_eq!(chart.nam_sinh.to_string(), "1995");
        assert_eq!(chart.chart_config.labels, vec!["A", "B"]);
        assert_eq!(chart.chart_config.data, vec![10.0, 20.0]);
    }

    #[test]
    fn test_block_in_the_middle_keeps_both_sides() {
        let raw = format!("Mở đầu\n\n{}\n\nKết luận", VALID_BLOCK);
        let parsed = extract(&raw);
        assert!(parsed.chart.is_some());
        assert!(!parsed.display_text.contains("```"));
        assert!(parsed.display_text.starts_with("Mở đầu"));
        assert!(parsed.display_text.ends_with("Kết luận"));
    }

    #[test]
    fn test_multiline_block_with_whitespace() {
        let raw = "Đây là biểu đồ:\n```json\n  {\n    \"type\" : \"chart_data\",\n    \"nam_sinh\": \"Giáp Tuất 1994\",\n    \"chart_config\": {\"labels\": [\"Tài\"], \"data\": [75.5]}\n  }\n```\n";
        let parsed = extract(raw);
        assert_eq!(parsed.display_text, "Đây là biểu đồ:");
        let chart = parsed.chart.expect("chart should be extracted");
        assert_eq!(chart.nam_sinh, BirthYear::Text("Giáp Tuất 1994".to_string()));
        assert_eq!(chart.chart_config.data, vec![75.5]);
    }

    #[test]
    fn test_malformed_block_falls_back_to_raw_text() {
        let raw = "Xem nè ```json {\"type\": \"chart_data\", \"nam_sinh\": 1995, \"chart_config\": {labels}} ``` hết";
        let parsed = extract(raw);
        assert_eq!(parsed.display_text, raw);
        assert!(parsed.chart.is_none());
    }

    #[test]
    fn test_wrong_discriminant_is_not_a_match() {
        let raw = r#"```json {"type":"bar_data","nam_sinh":1995,"chart_config":{"labels":["A"],"data":[1]}} ```"#;
        let parsed = extract(raw);
        assert_eq!(parsed.display_text, raw);
        assert!(parsed.chart.is_none());
    }

    #[test]
    fn test_only_first_block_is_used() {
        let second = VALID_BLOCK.replace("1995", "2001");
        let raw = format!("{}\ngiữa\n{}", VALID_BLOCK, second);
        let parsed = extract(&raw);
        assert_eq!(parsed.chart.map(|c| c.nam_sinh.to_string()), Some("1995".to_string()));
        assert!(parsed.display_text.contains("2001"));
    }

    #[test]
    fn test_plain_json_fence_before_chart_is_left_alone() {
        let raw = format!(
            "Dữ liệu:\n```json\n{{\"a\": 1}}\n```\nBiểu đồ:\n{}\nhết",
            VALID_BLOCK
        );
        let parsed = extract(&raw);

        let chart = parsed.chart.expect("chart fence should still be found");
        assert_eq!(chart.chart_config.labels, vec!["A", "B"]);
        assert_eq!(
            parsed.display_text,
            "Dữ liệu:\n```json\n{\"a\": 1}\n```\nBiểu đồ:\n\nhết"
        );
    }

    #[test]
    fn test_chart_marker_outside_any_fence_is_ignored() {
        let raw = "```json\n{\"a\": 1}\n```\n\"type\": \"chart_data\" }";
        let parsed = extract(raw);
        assert_eq!(parsed.display_text, raw);
        assert!(parsed.chart.is_none());
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let raw = r#"```json {"type":"chart_data","nam_sinh":1995} ```"#;
        let parsed = extract(raw);
        assert_eq!(parsed.display_text, raw);
        assert!(parsed.chart.is_none());
    }
}
